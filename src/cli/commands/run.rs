//! The monitoring run: scan the day's logs, then deliver the report

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Args;

use crate::cli::Output;
use crate::config::LogMonitorConfig;
use crate::delivery::{DeliveryCoordinator, SendmailMailer, hostname};
use crate::report::{Report, ReportAggregator};

#[derive(Args, Default)]
pub struct RunArgs {
    /// Day to report on (YYYY-MM-DD); defaults to yesterday
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Print the report to stdout instead of saving and mailing it
    #[arg(short, long)]
    pub print_only: bool,

    /// Scanning threads (0 = one per core); overrides parallel.max_threads
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,
}

pub async fn execute(args: RunArgs, custom_config: Option<&str>, output: &Output) -> Result<()> {
    let config = LogMonitorConfig::load(custom_config)?;

    let day = match args.date {
        Some(day) => day,
        None => Local::now()
            .date_naive()
            .pred_opt()
            .context("Cannot determine yesterday's date")?,
    };

    let scan_config = config.to_scan_configuration(day, args.workers)?;
    let destinations = if args.print_only {
        Vec::new()
    } else {
        config.report.output_dirs.clone()
    };
    let crash_source = config.crash_source();

    // Scanning is blocking file and process I/O
    let report = tokio::task::spawn_blocking(move || -> Result<Report> {
        let mut aggregator = ReportAggregator::new(&scan_config, day).with_destinations(&destinations);
        if let Some(source) = &crash_source {
            aggregator = aggregator.with_crash_source(source);
        }
        aggregator
            .run(Local::now().naive_local())
            .context("Failed to produce the log report")
    })
    .await
    .context("Scan task failed")??;

    if args.print_only {
        print!("{}", report.render());
        return Ok(());
    }

    output.info(&format!(
        "{} hits in {} ({} files scanned, {} unreadable)",
        report.total_hits(),
        report.directory.display(),
        report.files_scanned,
        report.files_failed
    ));

    let settings = config.delivery_settings();
    if settings.output_dirs.is_empty() && settings.recipients.is_empty() && settings.truncated_recipients.is_empty() {
        output.warning("No output directories or email recipients configured; use --print-only to see the report");
        return Ok(());
    }

    let coordinator = DeliveryCoordinator::new(settings, hostname(), SendmailMailer::new(&config.email.sendmail));
    let outcome = tokio::task::spawn_blocking(move || coordinator.deliver(&report))
        .await
        .context("Delivery task failed")?;

    for path in &outcome.files_written {
        output.success(&format!("Report saved to {}", path.display()));
    }
    for subject in &outcome.emails_sent {
        output.success(&format!("Sent '{}'", subject));
    }
    if outcome.is_complete() {
        output.success("Report delivered");
    } else {
        for failure in &outcome.failures {
            output.warning(&format!("Could not deliver to {}: {:#}", failure.channel, failure.error));
        }
    }

    Ok(())
}
