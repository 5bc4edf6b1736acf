//! # Command Line Interface
//!
//! Operator commands for the configuration store: schema migrations, viewing
//! and editing stored configurations, and key generation.

pub mod output;

use crate::config::AppConfig;
use crate::domain::{InstanceRegistrationId, OdsSecretConfiguration};
use crate::observability::{init_observability, log_config_info};
use crate::provider::SecretConfigurationProvider;
use crate::services::AesGcmStringEncryptor;
use crate::storage::{create_pool, list_applied_migrations, run_db_migrations, validate_migrations};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ods-admin-config")]
#[command(about = "Encrypted configuration store tooling for the ODS admin application")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (TOML); environment variables override it
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database URL override
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// Show applied migrations and whether the schema is current
    Status,

    /// SQL connection configuration
    Sql {
        #[command(subcommand)]
        command: SqlCommands,
    },

    /// Per-instance secret configuration
    Secret {
        #[command(subcommand)]
        command: SecretCommands,
    },

    /// Print a fresh base64-encoded 256-bit encryption key
    GenerateKey,
}

#[derive(Subcommand)]
pub enum SqlCommands {
    /// Print the SQL configuration (re-encrypts the stored row)
    Show {
        /// Print passwords instead of masking them
        #[arg(long)]
        reveal: bool,
    },
}

#[derive(Subcommand)]
pub enum SecretCommands {
    /// Print the secret configuration for a scope
    Show {
        /// ODS instance registration id; omit for the shared configuration
        #[arg(long)]
        instance: Option<InstanceRegistrationId>,

        /// Print secrets instead of masking them
        #[arg(long)]
        reveal: bool,
    },

    /// Replace the secret configuration for a scope from a JSON file
    Set {
        /// ODS instance registration id; omit for the shared configuration
        #[arg(long)]
        instance: Option<InstanceRegistrationId>,

        /// JSON document with the configuration
        #[arg(long)]
        file: PathBuf,
    },
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::GenerateKey = cli.command {
        println!("{}", AesGcmStringEncryptor::generate_key()?);
        return Ok(());
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }

    let metrics = init_observability(&config.observability)?;
    log_config_info(&config);

    match cli.command {
        Commands::Migrate => {
            let pool = create_pool(&config.database).await?;
            println!("Running database migrations...");
            run_db_migrations(&pool).await?;
            println!("Migrations completed successfully!");
        }
        Commands::Status => {
            config.database.auto_migrate = false;
            let pool = create_pool(&config.database).await?;
            output::print_migrations_table(&list_applied_migrations(&pool).await?);
            if validate_migrations(&pool).await? {
                println!("Database schema is up to date");
            } else {
                println!("Database schema has pending or unknown migrations");
                std::process::exit(1);
            }
        }
        Commands::Sql { command } => {
            let pool = create_pool(&config.database).await?;
            let provider = SecretConfigurationProvider::from_config(&config, pool, metrics)?;
            handle_sql_command(command, &provider).await?
        }
        Commands::Secret { command } => {
            let pool = create_pool(&config.database).await?;
            let provider = SecretConfigurationProvider::from_config(&config, pool, metrics)?;
            handle_secret_command(command, &provider).await?
        }
        // handled before configuration is loaded
        Commands::GenerateKey => {}
    }

    Ok(())
}

async fn handle_sql_command(
    command: SqlCommands,
    provider: &SecretConfigurationProvider,
) -> anyhow::Result<()> {
    match command {
        SqlCommands::Show { reveal } => match provider.get_sql_configuration().await? {
            Some(config) if reveal => output::print_json(&config)?,
            Some(config) => output::print_json(&output::masked_sql(&config))?,
            None => println!("No SQL configuration stored"),
        },
    }
    Ok(())
}

async fn handle_secret_command(
    command: SecretCommands,
    provider: &SecretConfigurationProvider,
) -> anyhow::Result<()> {
    match command {
        SecretCommands::Show { instance, reveal } => {
            match provider.get_secret_configuration(instance).await? {
                Some(config) if reveal => output::print_json(&config)?,
                Some(config) => output::print_json(&output::masked_secret(&config))?,
                None => println!(
                    "No secret configuration stored for {}",
                    scope_label(instance)
                ),
            }
        }
        SecretCommands::Set { instance, file } => {
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let config: OdsSecretConfiguration =
                serde_json::from_str(&contents).with_context(|| {
                    format!("{} is not a valid secret configuration", file.display())
                })?;

            provider.set_secret_configuration(&config, instance).await?;
            println!("Stored secret configuration for {}", scope_label(instance));
        }
    }
    Ok(())
}

fn scope_label(scope: Option<InstanceRegistrationId>) -> String {
    match scope {
        Some(id) => format!("instance {}", id),
        None => "the shared scope".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_secret_set() {
        let cli = Cli::try_parse_from([
            "ods-admin-config",
            "secret",
            "set",
            "--instance",
            "42",
            "--file",
            "secrets.json",
        ])
        .unwrap();

        match cli.command {
            Commands::Secret {
                command: SecretCommands::Set { instance, file },
            } => {
                assert_eq!(instance, Some(InstanceRegistrationId::new(42)));
                assert_eq!(file, PathBuf::from("secrets.json"));
            }
            _ => panic!("expected secret set"),
        }
    }

    #[test]
    fn test_parse_rejects_non_numeric_instance() {
        let result =
            Cli::try_parse_from(["ods-admin-config", "secret", "show", "--instance", "abc"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_scope_label() {
        assert_eq!(scope_label(None), "the shared scope");
        assert_eq!(
            scope_label(Some(InstanceRegistrationId::new(3))),
            "instance 3"
        );
    }
}
