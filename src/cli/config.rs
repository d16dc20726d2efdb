//! Configuration management CLI commands.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::{Config, SamplingSetting};
use crate::constants::APP_NAME;
use crate::models::Sampling;
use clap::{Args, Subcommand};

/// Configuration management commands
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set configuration values
    Set(ConfigSetArgs),
}

/// Display current configuration
#[derive(Args, Debug, Clone)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigSetArgs {
    /// Catalog service root URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Debounce window for profile edits in milliseconds
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Default category (bauteilTyp)
    #[arg(long = "bauteil-typ", value_name = "TYPE")]
    bauteil_typ: Option<String>,

    /// Sampling mode (none, horizontal, or vertical)
    #[arg(long, value_name = "MODE")]
    sampling: Option<String>,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Set(args) => args.execute(),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;

        if self.json {
            print_json(&config)?;
        } else {
            output_human_readable(&config);
        }

        Ok(())
    }
}

impl ConfigSetArgs {
    fn is_empty(&self) -> bool {
        self.base_url.is_none()
            && self.timeout.is_none()
            && self.debounce_ms.is_none()
            && self.bauteil_typ.is_none()
            && self.sampling.is_none()
    }

    /// Applies the given options to `config` and validates the result.
    fn apply(&self, config: &mut Config) -> CliResult<()> {
        if let Some(url) = &self.base_url {
            config.api.base_url.clone_from(url);
        }
        if let Some(timeout) = self.timeout {
            config.api.timeout_secs = timeout;
        }
        if let Some(debounce) = self.debounce_ms {
            config.session.debounce_ms = debounce;
        }
        if let Some(typ) = &self.bauteil_typ {
            config.session.bauteil_typ = typ.trim().to_string();
        }
        if let Some(mode) = &self.sampling {
            let sampling =
                Sampling::parse_optional(mode).map_err(|e| CliError::validation(e.to_string()))?;
            config.session.sampling = SamplingSetting::from(sampling);
        }

        config
            .validate()
            .map_err(|e| CliError::validation(format!("{e:#}")))
    }

    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        // At least one argument must be provided
        if self.is_empty() {
            return Err(CliError::validation(
                "At least one configuration option must be specified: --base-url, --timeout, --debounce-ms, --bauteil-typ, or --sampling",
            ));
        }

        let mut config = Config::load().unwrap_or_default();
        self.apply(&mut config)?;

        config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Configuration updated successfully.");

        Ok(())
    }
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config) {
    println!("{APP_NAME} Configuration");
    println!("=======================");
    println!();

    println!("API:");
    println!("  Base URL: {}", config.api.base_url);
    println!("  Timeout: {} s", config.api.timeout_secs);
    println!();

    println!("Session:");
    println!("  Category: {}", config.session.bauteil_typ);
    println!("  Sampling: {}", config.session.sampling);
    println!("  Debounce: {} ms", config.session.debounce_ms);
    println!();

    println!("Plot:");
    println!("  Exact: {}", config.plot.exact_color);
    println!("  Tolerance: {}", config.plot.tolerance_color);
    println!("  Fail: {}", config.plot.fail_color);
    println!("  Total: {}", config.plot.total_color);
    println!();
}
