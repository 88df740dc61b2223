use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use super::patterns::LinePatterns;
use super::types::{FileScan, MatchBlock, PatternHitCounts, ScanConfiguration};

/// Bytes inspected when deciding whether a file is binary
const BINARY_SNIFF_LEN: usize = 8192;

/// Separator between non-adjacent context windows
pub const GROUP_SEPARATOR: &str = "--";

/// Finds relevant lines in log text and renders them with context.
///
/// Holds only compiled patterns, so one matcher is shared by all scanning
/// workers and repeated scans of the same text give the same result.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    patterns: LinePatterns,
    context_lines: usize,
}

impl PatternMatcher {
    pub fn new(config: &ScanConfiguration) -> Self {
        Self::with_patterns(
            LinePatterns::new(&config.include_patterns, &config.exclude_patterns),
            config.context_lines,
        )
    }

    pub fn with_patterns(patterns: LinePatterns, context_lines: usize) -> Self {
        Self {
            patterns,
            context_lines,
        }
    }

    pub fn patterns(&self) -> &LinePatterns {
        &self.patterns
    }

    /// Read and scan one file. Failures become a `FileScan::Failed` value so
    /// a single bad file never stops the run.
    pub fn scan_file(&self, path: &Path) -> FileScan {
        match self.read_text(path) {
            Ok(text) => {
                let (block, counts) = self.scan(path, &text);
                debug!("Scanned {} ({} hits)", path.display(), counts.total());
                FileScan::Scanned {
                    path: path.to_path_buf(),
                    block,
                    counts,
                }
            }
            Err(e) => {
                debug!("Failed to scan {}: {:#}", path.display(), e);
                FileScan::Failed {
                    path: path.to_path_buf(),
                    reason: format!("{:#}", e),
                }
            }
        }
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let head = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
        if head.contains(&0) {
            anyhow::bail!("binary content");
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Scan `text` that came from `source`.
    ///
    /// Returns the rendered block (None when no hit survives the exclude
    /// patterns) and the per-pattern counts over the surviving hit lines.
    pub fn scan(&self, source: &Path, text: &str) -> (Option<MatchBlock>, PatternHitCounts) {
        let mut counts = PatternHitCounts::zeroed(self.patterns.include.iter().map(|p| p.text.as_str()));
        if self.patterns.include.is_empty() {
            return (None, counts);
        }

        let lines: Vec<&str> = text.lines().collect();
        let excluded: Vec<bool> = lines.iter().map(|l| self.patterns.is_excluded(l)).collect();

        let mut windows: Vec<(usize, usize)> = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            if excluded[idx] || !self.patterns.is_included(line) {
                continue;
            }

            for pattern in &self.patterns.include {
                counts.add(&pattern.text, pattern.regex.find_iter(line).count());
            }

            let start = idx.saturating_sub(self.context_lines);
            let end = (idx + self.context_lines).min(lines.len() - 1);
            match windows.last_mut() {
                Some((_, last_end)) if start <= *last_end + 1 => *last_end = (*last_end).max(end),
                _ => windows.push((start, end)),
            }
        }

        if windows.is_empty() {
            return (None, counts);
        }

        let mut rendered: Vec<&str> = Vec::new();
        let mut suppressed_lines = false;
        for (i, (start, end)) in windows.iter().enumerate() {
            if i > 0 {
                rendered.push(GROUP_SEPARATOR);
            }
            for idx in *start..=*end {
                if excluded[idx] {
                    suppressed_lines = true;
                } else {
                    rendered.push(lines[idx]);
                }
            }
        }

        let block = MatchBlock {
            source: source.to_path_buf(),
            text: rendered.join("\n"),
            suppressed_lines,
        };
        (Some(block), counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const APP_LOG: &str = "INFO start\nERROR disk full\nINFO done\n";

    fn matcher(include: &[&str], exclude: &[&str], context: usize) -> PatternMatcher {
        let mut config = ScanConfiguration::new("/logs", include.iter().map(|s| s.to_string()).collect());
        config.exclude_patterns = exclude.iter().map(|s| s.to_string()).collect();
        config.context_lines = context;
        PatternMatcher::new(&config)
    }

    #[test]
    fn test_hit_with_context_covers_whole_file() {
        let (block, counts) = matcher(&["ERROR"], &[], 1).scan(Path::new("app.log"), APP_LOG);

        let block = block.expect("block expected");
        assert_eq!(block.text, "INFO start\nERROR disk full\nINFO done");
        assert!(!block.suppressed_lines);
        assert_eq!(counts.get("ERROR"), 1);
    }

    #[test]
    fn test_excluded_hit_leaves_nothing() {
        let (block, counts) = matcher(&["ERROR"], &["disk full"], 1).scan(Path::new("app.log"), APP_LOG);
        assert!(block.is_none());
        assert_eq!(counts.get("ERROR"), 0);
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_empty_include_set_matches_nothing() {
        let (block, counts) = matcher(&[], &[], 3).scan(Path::new("app.log"), APP_LOG);
        assert!(block.is_none());
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let (block, counts) = matcher(&["error"], &[], 0).scan(Path::new("app.log"), APP_LOG);
        assert_eq!(block.unwrap().text, "ERROR disk full");
        assert_eq!(counts.get("error"), 1);
    }

    #[test]
    fn test_context_is_clamped_at_boundaries() {
        let text = "ERROR first\na\nb\nc\nd\nERROR last";
        let (block, counts) = matcher(&["ERROR"], &[], 2).scan(Path::new("x.log"), text);

        let block = block.unwrap();
        let lines: Vec<_> = block.lines().collect();
        assert_eq!(lines, vec!["ERROR first", "a", "b", "c", "d", "ERROR last"]);
        assert_eq!(counts.get("ERROR"), 2);
    }

    #[test]
    fn test_distant_windows_are_separated() {
        let text = "ERROR one\n1\n2\n3\n4\n5\nERROR two\n6";
        let (block, _) = matcher(&["ERROR"], &[], 1).scan(Path::new("x.log"), text);

        let lines: Vec<_> = block.as_ref().unwrap().lines().collect();
        assert_eq!(lines, vec!["ERROR one", "1", GROUP_SEPARATOR, "5", "ERROR two", "6"]);
    }

    #[test]
    fn test_overlapping_windows_do_not_duplicate_lines() {
        let text = "a\nERROR one\nb\nERROR two\nc";
        let (block, counts) = matcher(&["ERROR"], &[], 2).scan(Path::new("x.log"), text);

        assert_eq!(block.unwrap().text, text);
        assert_eq!(counts.get("ERROR"), 2);
    }

    #[test]
    fn test_excluded_context_line_is_dropped_and_flagged() {
        let text = "heartbeat ok\nFATAL crash\nheartbeat ok\nnext";
        let (block, counts) = matcher(&["FATAL"], &["heartbeat"], 1).scan(Path::new("x.log"), text);

        let block = block.unwrap();
        assert_eq!(block.text, "FATAL crash");
        assert!(block.suppressed_lines);
        assert_eq!(counts.get("FATAL"), 1);
    }

    #[test]
    fn test_counts_every_occurrence_per_pattern() {
        let text = "ERROR ERROR\nFATAL and error\nok";
        let (_, counts) = matcher(&["ERROR", "FATAL", "panic"], &[], 0).scan(Path::new("x.log"), text);

        assert_eq!(counts.get("ERROR"), 3);
        assert_eq!(counts.get("FATAL"), 1);
        assert_eq!(counts.get("panic"), 0);
    }

    #[test]
    fn test_scan_is_repeatable() {
        let m = matcher(&["ERROR"], &["disk"], 1);
        let text = "a\nERROR x\nERROR disk\nb";
        assert_eq!(m.scan(Path::new("x.log"), text), m.scan(Path::new("x.log"), text));
    }

    #[test]
    fn test_scan_file_reports_unreadable_and_binary_files() {
        let temp_dir = TempDir::new().unwrap();
        let binary = temp_dir.path().join("core.bin");
        fs::write(&binary, b"ERROR\0\x01\x02").unwrap();

        let m = matcher(&["ERROR"], &[], 0);
        match m.scan_file(&binary) {
            FileScan::Failed { reason, .. } => assert!(reason.contains("binary")),
            other => panic!("expected failure, got {:?}", other),
        }

        let missing = temp_dir.path().join("gone.log");
        assert!(matches!(m.scan_file(&missing), FileScan::Failed { .. }));
    }

    #[test]
    fn test_scan_file_reads_content() {
        let temp_dir = TempDir::new().unwrap();
        let log = temp_dir.path().join("app.log");
        fs::write(&log, APP_LOG).unwrap();

        let scan = matcher(&["ERROR"], &[], 0).scan_file(&log);
        assert_eq!(scan.hits(), 1);
        assert_eq!(scan.file_name(), "app.log");
    }
}
