use chrono::{NaiveDate, NaiveDateTime};
use std::path::PathBuf;
use tracing::{info, warn};

use super::{BANNER, Report};
use crate::crash::{CrashDetector, CrashEvent, CrashLineSource};
use crate::error::ScanError;
use crate::scanner::{FileScan, FileSelector, PatternHitCounts, PatternMatcher, ScanConfiguration};

const FILE_RULE: &str = "========================================";
const SECTION_RULE: &str = "----------------------------------------";
const CRASH_RULE: &str = "==========================================";

/// What the crash sub-task produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrashOutcome {
    Detected(Vec<CrashEvent>),
    /// The line source could not be queried
    Unavailable(String),
}

#[derive(Debug)]
struct CrashSection {
    source: String,
    signature: String,
    outcome: CrashOutcome,
}

impl CrashSection {
    /// Crash detection is on but nothing was given to read crash lines from
    fn without_source() -> Self {
        warn!("Crash detection enabled without a crash line source");
        Self {
            source: String::new(),
            signature: String::new(),
            outcome: CrashOutcome::Unavailable("no crash line source configured".to_string()),
        }
    }
}

/// Drives one run: file selection, scanning, crash detection and assembly
/// of the report.
pub struct ReportAggregator<'a> {
    config: &'a ScanConfiguration,
    day: NaiveDate,
    destinations: Vec<PathBuf>,
    crash_source: Option<&'a dyn CrashLineSource>,
}

impl<'a> ReportAggregator<'a> {
    pub fn new(config: &'a ScanConfiguration, day: NaiveDate) -> Self {
        Self {
            config,
            day,
            destinations: Vec::new(),
            crash_source: None,
        }
    }

    /// Output directories announced in the report header
    pub fn with_destinations(mut self, destinations: &[PathBuf]) -> Self {
        self.destinations = destinations.to_vec();
        self
    }

    /// Line source used when crash detection is enabled
    pub fn with_crash_source(mut self, source: &'a dyn CrashLineSource) -> Self {
        self.crash_source = Some(source);
        self
    }

    /// Run the scan and assemble the report.
    ///
    /// Fails only when the log directory cannot be enumerated (or a worker
    /// thread panics); every per-file or per-line problem ends up annotated
    /// in the report instead.
    pub fn run(&self, reference_time: NaiveDateTime) -> Result<Report, ScanError> {
        let selector = FileSelector::from_config(self.config);
        info!("Selecting log files in {}", selector.directory().display());
        let paths: Vec<PathBuf> = selector.select()?.collect();
        let matcher = PatternMatcher::new(self.config);

        let crash_source = self.crash_source;

        let (scans, crash) = crossbeam::thread::scope(|s| -> Result<(Vec<FileScan>, Option<CrashSection>), ScanError> {
            let crash_task = self.config.crash_detection.then(|| {
                s.spawn(move |_| match crash_source {
                    Some(source) => self.detect_crashes(source, reference_time),
                    None => CrashSection::without_source(),
                })
            });

            let scans = matcher.scan_paths(paths, self.config.workers);

            let crash = match crash_task {
                Some(handle) => Some(handle.join().map_err(|_| ScanError::WorkerPanic("crash detection"))?),
                None => None,
            };
            Ok((scans?, crash))
        })
        .map_err(|_| ScanError::WorkerPanic("report aggregation"))??;

        info!("Assembling report");
        Ok(self.assemble(&matcher, scans, crash))
    }

    fn detect_crashes(&self, source: &dyn CrashLineSource, reference_time: NaiveDateTime) -> CrashSection {
        let detector = CrashDetector::new(self.config.crash_lookback, self.config.crash_ignore.clone())
            .with_timestamp_format(self.config.crash_timestamp_format.clone());

        let outcome = match source.candidate_lines() {
            Ok(text) => CrashOutcome::Detected(detector.detect(&text, reference_time)),
            Err(e) => {
                warn!("Crash detection unavailable: {:#}", e);
                CrashOutcome::Unavailable(format!("{:#}", e))
            }
        };

        CrashSection {
            source: source.name().to_string(),
            signature: source.signature().to_string(),
            outcome,
        }
    }

    fn assemble(
        &self,
        matcher: &PatternMatcher,
        scans: Vec<FileScan>,
        crash: Option<CrashSection>,
    ) -> Report {
        let directory = self.config.directory.clone();
        let patterns = matcher.patterns();
        let mut header = vec![
            BANNER.to_string(),
            "##                  LOG FILE REPORT                    ##".to_string(),
            BANNER.to_string(),
            format!("##                  {}                         ##", self.day.format("%Y-%m-%d")),
            BANNER.to_string(),
            format!("Searching {}", directory.display()),
            "----------------------------------------------".to_string(),
        ];

        if !self.destinations.is_empty() {
            header.push("Report is being saved to files in:".to_string());
            let stamp = self.day.format("%Y%m%d").to_string();
            for destination in &self.destinations {
                header.push(format!("\t{}", destination.join(&stamp).display()));
            }
            header.push("---------------------------------------------".to_string());
        }

        let mut summary = Vec::new();
        let mut detail = Vec::new();
        let mut totals = PatternHitCounts::zeroed(patterns.include.iter().map(|p| p.text.as_str()));
        let mut files_failed = 0;

        for scan in &scans {
            let file_name = scan.file_name();
            detail.push(FILE_RULE.to_string());
            detail.push(format!("looking at: {}", scan.path().display()));

            match scan {
                FileScan::Scanned { block, counts, .. } => {
                    for (pattern, hits) in counts.iter() {
                        if hits > 0 || self.config.verbose_summary {
                            summary.push(format!("SUMMARY: {} instances of {} in {}", hits, pattern, file_name));
                        }
                    }
                    totals.merge(counts);

                    if let Some(block) = block {
                        detail.push(SECTION_RULE.to_string());
                        detail.push(format!("looking for: {}", patterns.describe()));
                        detail.extend(block.lines().map(str::to_string));
                    }
                }
                FileScan::Failed { reason, .. } => {
                    files_failed += 1;
                    summary.push(format!("WARNING: could not scan {}: {}", file_name, reason));
                    detail.push(format!("skipped: {}", reason));
                }
            }
        }

        for skipped in &patterns.skipped {
            summary.push(format!(
                "WARNING: skipped invalid pattern '{}': {}",
                skipped.pattern, skipped.reason
            ));
        }

        let mut crash_events = 0;
        if let Some(CrashSection { source, signature, outcome }) = crash {
            match outcome {
                CrashOutcome::Detected(events) => {
                    detail.push(String::new());
                    detail.push(CRASH_RULE.to_string());
                    detail.push(format!("Looking for {}s in {}:", signature, source));
                    detail.push(SECTION_RULE.to_string());

                    crash_events = events.len();
                    summary.push(format!(
                        "SUMMARY: {} {}s found in {} in last {} minutes.",
                        crash_events,
                        signature,
                        source,
                        self.config.crash_lookback.num_minutes()
                    ));
                    detail.extend(events.into_iter().map(|e| e.line));
                }
                CrashOutcome::Unavailable(reason) => {
                    summary.push(format!("SUMMARY: crash detection unavailable: {}", reason));
                }
            }
        }

        Report::new(
            self.day,
            directory,
            header,
            summary,
            detail,
            totals,
            crash_events,
            scans.len(),
            files_failed,
        )
    }
}
