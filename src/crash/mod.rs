//! Crash event detection
//!
//! Candidate lines come from an external source (by default `dmesg -T`
//! filtered to lines carrying the crash signature). This module only parses
//! their bracketed timestamps and decides which events are recent enough to
//! report.

pub mod source;

use chrono::{NaiveDateTime, TimeDelta};
use regex::Regex;
use tracing::{debug, warn};

pub use source::{CommandSource, CrashLineSource};

/// `dmesg -T` style stamp, e.g. `Mon Jan  1 00:00:00 2024`, matched after
/// runs of whitespace are collapsed.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// A crash line and the time it was logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashEvent {
    pub timestamp: NaiveDateTime,
    pub line: String,
}

/// Keeps the crash events younger than the lookback window.
#[derive(Debug, Clone)]
pub struct CrashDetector {
    lookback: TimeDelta,
    ignore: Option<Regex>,
    timestamp_format: String,
}

impl CrashDetector {
    pub fn new(lookback: TimeDelta, ignore: Option<Regex>) -> Self {
        Self {
            lookback,
            ignore,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }

    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    /// Events from `text` whose age at `reference_time` is strictly below the
    /// lookback window and which the ignore pattern does not match, in input
    /// order. Lines without a parsable timestamp are skipped.
    pub fn detect(&self, text: &str, reference_time: NaiveDateTime) -> Vec<CrashEvent> {
        let mut events = Vec::new();

        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let Some(timestamp) = self.parse_timestamp(line) else {
                warn!("Skipping crash line with unparsable timestamp: {}", line);
                continue;
            };

            if reference_time - timestamp >= self.lookback {
                debug!("Crash at {} is older than the lookback window", timestamp);
                continue;
            }

            if self.ignore.as_ref().is_some_and(|re| re.is_match(line)) {
                debug!("Ignoring crash line: {}", line);
                continue;
            }

            events.push(CrashEvent {
                timestamp,
                line: line.to_string(),
            });
        }

        events
    }

    /// Parse the `[...]` prefix of a line
    pub fn parse_timestamp(&self, line: &str) -> Option<NaiveDateTime> {
        let (stamp, _) = line.trim_start().strip_prefix('[')?.split_once(']')?;
        let stamp = stamp.split_whitespace().collect::<Vec<_>>().join(" ");
        NaiveDateTime::parse_from_str(&stamp, &self.timestamp_format).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SEGFAULT: &str = "[Mon Jan  1 00:00:00 2024] app[42]: segfault at 0 ip 00007f sp 00007ffd error 4";

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn test_recent_crash_is_kept() {
        let detector = CrashDetector::new(TimeDelta::minutes(1440), None);
        let events = detector.detect(SEGFAULT, at(0, 30));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].timestamp, at(0, 0));
        assert_eq!(events[0].line, SEGFAULT);
    }

    #[test]
    fn test_old_crash_is_discarded() {
        let detector = CrashDetector::new(TimeDelta::minutes(10), None);
        assert!(detector.detect(SEGFAULT, at(0, 30)).is_empty());
    }

    #[test]
    fn test_age_equal_to_window_is_discarded() {
        let detector = CrashDetector::new(TimeDelta::minutes(30), None);
        assert!(detector.detect(SEGFAULT, at(0, 30)).is_empty());

        let detector = CrashDetector::new(TimeDelta::minutes(31), None);
        assert_eq!(detector.detect(SEGFAULT, at(0, 30)).len(), 1);
    }

    #[test]
    fn test_ignore_pattern_discards_regardless_of_age() {
        let detector = CrashDetector::new(TimeDelta::minutes(1440), Some(Regex::new(r"app\[\d+\]").unwrap()));
        assert!(detector.detect(SEGFAULT, at(0, 30)).is_empty());
    }

    #[test]
    fn test_malformed_lines_do_not_abort_detection() {
        let text = format!(
            "[12345.678901] segfault at 0\nsegfault without stamp\n[Xyz Foo 99 99:99:99 2024] segfault\n{}\n",
            SEGFAULT
        );
        let detector = CrashDetector::new(TimeDelta::minutes(1440), None);
        let events = detector.detect(&text, at(0, 30));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].line, SEGFAULT);
    }

    #[test]
    fn test_output_keeps_input_order() {
        let text = "[Mon Jan  1 00:05:00 2024] b segfault\n[Mon Jan  1 00:01:00 2024] a segfault\n";
        let detector = CrashDetector::new(TimeDelta::minutes(60), None);
        let events = detector.detect(text, at(0, 30));

        let lines: Vec<_> = events.iter().map(|e| e.line.as_str()).collect();
        assert_eq!(lines, vec!["[Mon Jan  1 00:05:00 2024] b segfault", "[Mon Jan  1 00:01:00 2024] a segfault"]);
    }

    #[test]
    fn test_every_decision_respects_window_and_ignore() {
        let text = "[Sun Dec 31 20:00:00 2023] worker segfault\n\
                    [Sun Dec 31 23:50:00 2023] worker segfault\n\
                    [Sun Dec 31 23:55:00 2023] noisy segfault\n\
                    [Mon Jan  1 00:10:00 2024] worker segfault\n";
        let window = TimeDelta::minutes(60);
        let ignore = Regex::new("noisy").unwrap();
        let detector = CrashDetector::new(window, Some(ignore.clone()));
        let reference = at(0, 30);

        let kept = detector.detect(text, reference);
        assert_eq!(kept.len(), 2);

        for line in text.lines() {
            let timestamp = detector.parse_timestamp(line).unwrap();
            let should_keep = reference - timestamp < window && !ignore.is_match(line);
            assert_eq!(kept.iter().any(|e| e.line == line), should_keep, "{}", line);
        }
    }

    #[test]
    fn test_custom_timestamp_format() {
        let detector = CrashDetector::new(TimeDelta::minutes(60), None).with_timestamp_format("%Y-%m-%dT%H:%M:%S");
        let events = detector.detect("[2024-01-01T00:20:00] segfault", at(0, 30));
        assert_eq!(events.len(), 1);
    }
}
