use chrono::TimeDelta;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Everything one monitoring run needs to know about what to scan.
///
/// Built once from the loaded configuration and then only borrowed; none of
/// the scanning components read configuration from anywhere else.
#[derive(Debug, Clone)]
pub struct ScanConfiguration {
    /// Directory holding the day's log files
    pub directory: PathBuf,
    /// Content patterns that make a line relevant, in report order
    pub include_patterns: Vec<String>,
    /// Content patterns that suppress a line
    pub exclude_patterns: Vec<String>,
    /// Lines of context shown before and after each hit
    pub context_lines: usize,
    /// Only file names matching this are scanned
    pub name_include: Option<Regex>,
    /// File names matching this are never scanned
    pub name_exclude: Option<Regex>,
    pub crash_detection: bool,
    /// Maximum age of a crash event to be reported
    pub crash_lookback: TimeDelta,
    /// Crash lines matching this are dropped
    pub crash_ignore: Option<Regex>,
    /// chrono format of the bracketed crash timestamp
    pub crash_timestamp_format: String,
    /// Report files with zero hits in the summary as well
    pub verbose_summary: bool,
    /// Scanning threads (0 = one per available core)
    pub workers: usize,
}

impl ScanConfiguration {
    /// A configuration that scans `directory` for `include_patterns` with
    /// everything else switched off.
    pub fn new(directory: impl Into<PathBuf>, include_patterns: Vec<String>) -> Self {
        Self {
            directory: directory.into(),
            include_patterns,
            exclude_patterns: Vec::new(),
            context_lines: 0,
            name_include: None,
            name_exclude: None,
            crash_detection: false,
            crash_lookback: TimeDelta::minutes(1440),
            crash_ignore: None,
            crash_timestamp_format: crate::crash::DEFAULT_TIMESTAMP_FORMAT.to_string(),
            verbose_summary: false,
            workers: 0,
        }
    }
}

/// Excerpt of one file: every surviving hit with its context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchBlock {
    pub source: PathBuf,
    /// Rendered lines; non-adjacent context windows are separated by `--`
    pub text: String,
    /// True when exclude patterns removed at least one line inside a window
    pub suppressed_lines: bool,
}

impl MatchBlock {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

/// Per-pattern hit counts, kept in configured pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternHitCounts {
    counts: Vec<(String, usize)>,
}

impl PatternHitCounts {
    /// All patterns present with a count of zero
    pub fn zeroed<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            counts: patterns.into_iter().map(|p| (p.to_string(), 0)).collect(),
        }
    }

    pub fn get(&self, pattern: &str) -> usize {
        self.counts
            .iter()
            .find(|(p, _)| p == pattern)
            .map_or(0, |(_, n)| *n)
    }

    pub fn add(&mut self, pattern: &str, hits: usize) {
        match self.counts.iter_mut().find(|(p, _)| p == pattern) {
            Some((_, n)) => *n += hits,
            None => self.counts.push((pattern.to_string(), hits)),
        }
    }

    /// Fold another file's counts into this run-wide total
    pub fn merge(&mut self, other: &PatternHitCounts) {
        for (pattern, hits) in other.iter() {
            self.add(pattern, hits);
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(p, n)| (p.as_str(), *n))
    }
}

/// Outcome of scanning a single candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileScan {
    Scanned {
        path: PathBuf,
        block: Option<MatchBlock>,
        counts: PatternHitCounts,
    },
    Failed {
        path: PathBuf,
        reason: String,
    },
}

impl FileScan {
    pub fn path(&self) -> &Path {
        match self {
            FileScan::Scanned { path, .. } | FileScan::Failed { path, .. } => path,
        }
    }

    /// File name as shown in summary lines
    pub fn file_name(&self) -> String {
        let path = self.path();
        path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string())
    }

    pub fn hits(&self) -> usize {
        match self {
            FileScan::Scanned { counts, .. } => counts.total(),
            FileScan::Failed { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_keep_configured_order() {
        let mut counts = PatternHitCounts::zeroed(["ERROR", "FATAL", "panic"]);
        counts.add("panic", 2);
        counts.add("ERROR", 1);

        let order: Vec<_> = counts.iter().map(|(p, _)| p).collect();
        assert_eq!(order, vec!["ERROR", "FATAL", "panic"]);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_merge_sums_per_pattern() {
        let mut total = PatternHitCounts::zeroed(["ERROR", "FATAL"]);
        let mut file = PatternHitCounts::zeroed(["ERROR", "FATAL"]);
        file.add("ERROR", 4);
        total.merge(&file);
        total.merge(&file);

        assert_eq!(total.get("ERROR"), 8);
        assert_eq!(total.get("FATAL"), 0);
        assert_eq!(total.get("missing"), 0);
    }
}
