pub mod core;
pub mod directory;
pub mod parallel;
pub mod patterns;
pub mod types;

// Re-export main types for easier access
pub use self::core::PatternMatcher;
pub use directory::FileSelector;
pub use patterns::{LinePattern, LinePatterns, SkippedPattern};
pub use types::{FileScan, MatchBlock, PatternHitCounts, ScanConfiguration};
