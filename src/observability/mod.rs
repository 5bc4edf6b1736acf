//! # Observability Infrastructure
//!
//! Structured logging and metrics for the configuration store.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, log_config_info};
pub use metrics::{describe_metrics, MetricsRecorder};

use crate::config::ObservabilityConfig;
use crate::errors::Result;
use ::tracing::info;

/// Initialize logging and return the metrics recorder to hand to the provider
pub fn init_observability(config: &ObservabilityConfig) -> Result<MetricsRecorder> {
    let installed = init_logging(config)?;

    let recorder = if config.enable_metrics {
        describe_metrics();
        MetricsRecorder::new()
    } else {
        MetricsRecorder::disabled()
    };

    info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        json_logging = config.json_logging,
        subscriber_installed = installed,
        metrics_enabled = config.enable_metrics,
        "Observability initialized"
    );

    Ok(recorder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_observability_respects_metrics_flag() {
        let config = ObservabilityConfig {
            enable_metrics: false,
            ..Default::default()
        };
        let recorder = init_observability(&config).unwrap();
        assert!(!recorder.is_enabled());
    }
}
