//! # Metrics Collection
//!
//! Counters and histograms recorded through the `metrics` facade. Nothing is
//! exported unless the embedding application installs a recorder.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

/// Records cache and store activity
#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    enabled: bool,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    /// Create an enabled recorder
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Create a recorder that drops everything
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a cache lookup for a configuration kind
    pub fn record_cache_lookup(&self, kind: &str, hit: bool) {
        if !self.enabled {
            return;
        }
        let result = if hit { "hit" } else { "miss" };
        let labels = [("kind", kind.to_string()), ("result", result.to_string())];
        counter!("config_cache_lookups_total", &labels).increment(1);
    }

    /// Record a store operation with its duration
    pub fn record_store_operation(&self, operation: &str, duration: f64, success: bool) {
        if !self.enabled {
            return;
        }
        let status = if success { "success" } else { "error" };
        let labels = [("operation", operation.to_string()), ("status", status.to_string())];
        counter!("config_store_operations_total", &labels).increment(1);

        let duration_labels = [("operation", operation.to_string())];
        histogram!("config_store_operation_duration_seconds", &duration_labels).record(duration);
    }

    /// Record a stored payload that was read as unencrypted JSON
    pub fn record_legacy_payload(&self, kind: &str) {
        if !self.enabled {
            return;
        }
        let labels = [("kind", kind.to_string())];
        counter!("config_legacy_payloads_total", &labels).increment(1);
    }
}

/// Register metric descriptions with the installed recorder
pub fn describe_metrics() {
    describe_counter!(
        "config_cache_lookups_total",
        Unit::Count,
        "Configuration cache lookups by kind and result"
    );
    describe_counter!(
        "config_store_operations_total",
        Unit::Count,
        "Configuration store operations by operation and status"
    );
    describe_histogram!(
        "config_store_operation_duration_seconds",
        Unit::Seconds,
        "Configuration store operation latency"
    );
    describe_counter!(
        "config_legacy_payloads_total",
        Unit::Count,
        "Stored configurations read as unencrypted JSON"
    );
}
