//! The report handed from the scanner to delivery
//!
//! A report is a header, a summary and a detail section. It is rendered as
//! plain text for files and as HTML (`<br/>` line breaks) for email. The
//! total hit count is computed once when the report is assembled.

pub mod aggregator;

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::scanner::PatternHitCounts;

pub use aggregator::ReportAggregator;

pub const BANNER: &str = "#########################################################";
pub const SUMMARY_END: &str = "^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^";

/// Result of one monitoring run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Day whose logs were scanned
    pub day: NaiveDate,
    /// Directory that was scanned
    pub directory: PathBuf,
    pub header: Vec<String>,
    pub summary: Vec<String>,
    pub detail: Vec<String>,
    /// Hits per include pattern across all files
    pub pattern_totals: PatternHitCounts,
    /// Crash events kept by the detector
    pub crash_events: usize,
    pub files_scanned: usize,
    pub files_failed: usize,
    total_hits: usize,
}

impl Report {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        day: NaiveDate,
        directory: PathBuf,
        header: Vec<String>,
        summary: Vec<String>,
        detail: Vec<String>,
        pattern_totals: PatternHitCounts,
        crash_events: usize,
        files_scanned: usize,
        files_failed: usize,
    ) -> Self {
        let total_hits = pattern_totals.total() + crash_events;
        Self {
            day,
            directory,
            header,
            summary,
            detail,
            pattern_totals,
            crash_events,
            files_scanned,
            files_failed,
            total_hits,
        }
    }

    /// Pattern hits in all files plus kept crash events
    pub fn total_hits(&self) -> usize {
        self.total_hits
    }

    /// `YYYYMMDD` form of the day, used for directory names
    pub fn day_stamp(&self) -> String {
        self.day.format("%Y%m%d").to_string()
    }

    fn lines(&self) -> impl Iterator<Item = &str> {
        self.header
            .iter()
            .chain(self.summary.iter())
            .map(String::as_str)
            .chain(std::iter::once(SUMMARY_END))
            .chain(self.detail.iter().map(String::as_str))
    }

    /// Plain-text rendering
    pub fn render(&self) -> String {
        let mut text = self.lines().collect::<Vec<_>>().join("\n");
        text.push('\n');
        text
    }

    /// HTML rendering of the full report
    pub fn render_html(&self) -> String {
        to_html(&self.render())
    }
}

/// First `max_chars` characters of `text` (all of it when shorter)
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Escape `text` and turn its line breaks into `<br/>`
pub fn to_html(text: &str) -> String {
    text.lines()
        .map(|line| {
            line.replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;")
                .replace('\t', "&nbsp;&nbsp;&nbsp;&nbsp;")
        })
        .collect::<Vec<_>>()
        .join("<br/>\n")
}
