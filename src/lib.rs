//! # logmonitor - daily log scanning with contextual error reports
//!
//! Scans one day's application log directory for lines matching
//! configurable patterns, keeps a window of context around every hit,
//! checks the kernel ring buffer for recent crash signatures and delivers
//! the resulting report to dated files and by email.
//!
//! ## Quick Start
//!
//! ```bash
//! # Write a config next to where cron runs it
//! logmonitor config init > logmonitor.toml
//!
//! # Look at yesterday's report without delivering it
//! logmonitor run --print-only
//!
//! # Scan a specific day and deliver
//! logmonitor run --date 2024-01-01
//! ```
//!
//! ## Library use
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use logmonitor::{ReportAggregator, ScanConfiguration};
//!
//! let config = ScanConfiguration::new("/var/log/app", vec!["ERROR".to_string()]);
//! let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let report = ReportAggregator::new(&config, day)
//!     .run(day.and_hms_opt(23, 59, 0).unwrap())
//!     .unwrap();
//! print!("{}", report.render());
//! ```

pub mod cli;
pub mod config;
pub mod crash;
pub mod delivery;
pub mod error;
pub mod parallel;
pub mod report;
pub mod scanner;

pub use cli::{Cli, Output};
pub use config::LogMonitorConfig;
pub use error::ScanError;
pub use report::{Report, ReportAggregator};
pub use scanner::ScanConfiguration;

/// Result type alias for logmonitor operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
