//! Command-line interface for logmonitor
//!
//! Parses arguments with clap, sets up logging and dispatches to the
//! command implementations in [`commands`]. Running without a subcommand
//! is the same as `logmonitor run`, which is what cron invokes.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

pub mod commands;
mod output;

pub use output::Output;

use commands::config::ConfigArgs;
use commands::run::RunArgs;

/// Scan a day's application logs and deliver a contextual error report
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the logs and deliver the report (default)
    Run(RunArgs),
    /// Configuration management
    Config(ConfigArgs),
    /// Show version information
    Version,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);

        let output = Output::new(self.verbose > 0, self.quiet);
        let custom_config = self.config.as_deref();

        match self.command {
            Some(Commands::Run(args)) => commands::run::execute(args, custom_config, &output).await,
            Some(Commands::Config(args)) => commands::config::execute(args, custom_config, &output).await,
            Some(Commands::Version) => commands::version::execute(&output).await,
            None => commands::run::execute(RunArgs::default(), custom_config, &output).await,
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // ignore's walker is chatty at debug level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => tracing_subscriber::EnvFilter::new("warn"),
        1 => tracing_subscriber::EnvFilter::new("info,ignore=warn"),
        2 => tracing_subscriber::EnvFilter::new("debug,ignore=warn"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
