//! Configuration management for logmonitor
//!
//! The typed sections below are extracted from a layered figment (see
//! `core.rs`) and then turned into the immutable [`ScanConfiguration`] and
//! [`DeliverySettings`] the rest of the crate works with.

use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeDelta};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::crash::CommandSource;
use crate::delivery::DeliverySettings;
use crate::error::ScanError;
use crate::scanner::ScanConfiguration;

pub mod core;
pub mod smart_load;

pub use self::core::DEFAULT_CONFIG;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMonitorConfig {
    pub logs: LogsConfig,
    pub search: SearchConfig,
    pub crash: CrashConfig,
    pub report: ReportConfig,
    pub email: EmailConfig,
    pub parallel: ParallelSettings,
}

/// Where the log files are and which of them to read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    pub directory: PathBuf,
    pub dated_subdirectory: bool,
    #[serde(default)]
    pub name_include: String,
    #[serde(default)]
    pub name_exclude: String,
}

/// Content patterns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub context_lines: usize,
}

/// Kernel crash detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrashConfig {
    pub enabled: bool,
    pub max_age_minutes: u32,
    #[serde(default)]
    pub ignore: String,
    pub signature: String,
    pub command: Vec<String>,
    pub timestamp_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub verbose_summary: bool,
    #[serde(default)]
    pub output_dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub truncated_recipients: Vec<String>,
    pub from: String,
    pub truncate_after: usize,
    pub sendmail: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelSettings {
    /// 0 = one worker per core
    pub max_threads: usize,
}

/// Empty string means "not set"
fn optional_regex(kind: &'static str, pattern: &str) -> Result<Option<Regex>, ScanError> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(pattern).map(Some).map_err(|source| ScanError::InvalidRegex {
        kind,
        pattern: pattern.to_string(),
        source,
    })
}

impl LogMonitorConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.logs.directory.as_os_str().is_empty() {
            anyhow::bail!("logs.directory cannot be empty");
        }

        let has_recipients = !self.email.recipients.is_empty() || !self.email.truncated_recipients.is_empty();
        if has_recipients && self.email.from.trim().is_empty() {
            anyhow::bail!("email.from is required when email recipients are configured");
        }

        if self.crash.enabled {
            if self.crash.max_age_minutes == 0 {
                anyhow::bail!("crash.max_age_minutes must be greater than 0");
            }
            if self.crash.command.is_empty() {
                anyhow::bail!("crash.command cannot be empty when crash detection is enabled");
            }
        }

        optional_regex("log name include", &self.logs.name_include)?;
        optional_regex("log name exclude", &self.logs.name_exclude)?;
        optional_regex("crash ignore", &self.crash.ignore)?;

        Ok(())
    }

    /// Directory scanned for `day`
    pub fn scan_directory(&self, day: NaiveDate) -> PathBuf {
        if self.logs.dated_subdirectory {
            self.logs.directory.join(day.format("%Y%m%d").to_string())
        } else {
            self.logs.directory.clone()
        }
    }

    /// Scan settings for `day`; `workers` overrides `parallel.max_threads`
    pub fn to_scan_configuration(&self, day: NaiveDate, workers: Option<usize>) -> Result<ScanConfiguration> {
        Ok(ScanConfiguration {
            directory: self.scan_directory(day),
            include_patterns: self.search.include.clone(),
            exclude_patterns: self.search.exclude.clone(),
            context_lines: self.search.context_lines,
            name_include: optional_regex("log name include", &self.logs.name_include)?,
            name_exclude: optional_regex("log name exclude", &self.logs.name_exclude)?,
            crash_detection: self.crash.enabled,
            crash_lookback: TimeDelta::minutes(i64::from(self.crash.max_age_minutes)),
            crash_ignore: optional_regex("crash ignore", &self.crash.ignore)?,
            crash_timestamp_format: self.crash.timestamp_format.clone(),
            verbose_summary: self.report.verbose_summary,
            workers: workers.unwrap_or(self.parallel.max_threads),
        })
    }

    pub fn delivery_settings(&self) -> DeliverySettings {
        DeliverySettings {
            output_dirs: self.report.output_dirs.clone(),
            recipients: self.email.recipients.clone(),
            truncated_recipients: self.email.truncated_recipients.clone(),
            from: self.email.from.clone(),
            truncate_after: self.email.truncate_after,
        }
    }

    /// Crash line source, when crash detection is enabled
    pub fn crash_source(&self) -> Option<CommandSource> {
        if !self.crash.enabled {
            return None;
        }
        CommandSource::from_command_line(&self.crash.command, &self.crash.signature)
    }

    /// Serialize in the given format (toml, json or yaml)
    pub fn to_format(&self, format: &str) -> Result<String> {
        match format {
            "toml" => toml::to_string_pretty(self).context("Failed to serialize configuration as TOML"),
            "json" => serde_json::to_string_pretty(self).context("Failed to serialize configuration as JSON"),
            "yaml" | "yml" => serde_yml::to_string(self).context("Failed to serialize configuration as YAML"),
            other => anyhow::bail!("Unsupported format '{}' (expected toml, json or yaml)", other),
        }
    }
}
