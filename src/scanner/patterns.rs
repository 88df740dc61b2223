use regex::{Regex, RegexBuilder};
use tracing::warn;

/// A compiled include pattern together with the text it was configured as.
#[derive(Debug, Clone)]
pub struct LinePattern {
    pub text: String,
    pub regex: Regex,
}

/// A configured pattern that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPattern {
    pub pattern: String,
    pub reason: String,
}

/// Case-insensitive include and exclude line patterns.
///
/// A pattern that fails to compile only disables itself; the rest of the set
/// stays usable and the failure is kept in `skipped` for the report.
#[derive(Debug, Clone, Default)]
pub struct LinePatterns {
    pub include: Vec<LinePattern>,
    pub exclude: Vec<Regex>,
    pub skipped: Vec<SkippedPattern>,
}

impl LinePatterns {
    pub fn new(include: &[String], exclude: &[String]) -> Self {
        let mut patterns = LinePatterns::default();

        for text in include {
            if let Some(regex) = patterns.compile(text) {
                patterns.include.push(LinePattern {
                    text: text.clone(),
                    regex,
                });
            }
        }

        for text in exclude {
            if let Some(regex) = patterns.compile(text) {
                patterns.exclude.push(regex);
            }
        }

        patterns
    }

    fn compile(&mut self, text: &str) -> Option<Regex> {
        match RegexBuilder::new(text).case_insensitive(true).build() {
            // Empty or zero-width patterns (``, `^`, `x*`) match every line
            Ok(regex) if regex.is_match("") => {
                self.skip(text, "matches every line".to_string());
                None
            }
            Ok(regex) => Some(regex),
            Err(e) => {
                self.skip(text, e.to_string());
                None
            }
        }
    }

    fn skip(&mut self, pattern: &str, reason: String) {
        warn!("Skipping invalid pattern '{}': {}", pattern, reason);
        self.skipped.push(SkippedPattern {
            pattern: pattern.to_string(),
            reason,
        });
    }

    pub fn is_included(&self, line: &str) -> bool {
        self.include.iter().any(|p| p.regex.is_match(line))
    }

    pub fn is_excluded(&self, line: &str) -> bool {
        self.exclude.iter().any(|r| r.is_match(line))
    }

    /// Include patterns joined the way the report shows what was searched for
    pub fn describe(&self) -> String {
        self.include
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }
}
