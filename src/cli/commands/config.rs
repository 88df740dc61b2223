//! Configuration command implementations

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::Output;
use crate::config::{DEFAULT_CONFIG, LogMonitorConfig};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the commented default configuration
    Init,
    /// Display the effective merged configuration
    Show {
        /// Output format: toml, json, yaml
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
    /// Load and validate the configuration
    Validate,
}

pub async fn execute(args: ConfigArgs, custom_config: Option<&str>, output: &Output) -> Result<()> {
    match args.command {
        ConfigCommand::Init => {
            print!("{}", DEFAULT_CONFIG);
        }
        ConfigCommand::Show { format } => {
            let config = LogMonitorConfig::load(custom_config)?;
            println!("{}", config.to_format(&format.to_lowercase())?);
        }
        ConfigCommand::Validate => {
            let config = LogMonitorConfig::load(custom_config)?;
            output.success("Configuration is valid");
            output.key_value("Log directory:", &config.logs.directory.display().to_string(), true);
            output.key_value("Include patterns:", &config.search.include.join(", "), false);
            output.key_value("Exclude patterns:", &config.search.exclude.join(", "), false);
            output.key_value(
                "Crash detection:",
                if config.crash.enabled { config.crash.signature.as_str() } else { "disabled" },
                false,
            );
            output.key_value("Output directories:", &config.report.output_dirs.len().to_string(), false);
            output.key_value(
                "Email recipients:",
                &(config.email.recipients.len() + config.email.truncated_recipients.len()).to_string(),
                false,
            );
        }
    }

    Ok(())
}
