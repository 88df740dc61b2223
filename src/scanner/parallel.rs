use std::path::PathBuf;
use tracing::info;

use super::core::PatternMatcher;
use super::types::FileScan;
use crate::error::ScanError;
use crate::parallel::ExecutionStrategy;

impl PatternMatcher {
    /// Scan every path, using up to `max_threads` workers (0 = all cores).
    ///
    /// The returned scans are in the same order as `paths`, so the report
    /// built from them does not depend on the worker count.
    pub fn scan_paths(&self, paths: Vec<PathBuf>, max_threads: usize) -> Result<Vec<FileScan>, ScanError> {
        let start_time = std::time::Instant::now();
        let file_count = paths.len();
        let strategy = ExecutionStrategy::auto(file_count, max_threads);

        let scans = strategy.execute(paths, |path| self.scan_file(&path), "log scan")?;

        let failed = scans.iter().filter(|s| matches!(s, FileScan::Failed { .. })).count();
        info!(
            "Scanned {} files in {:.2}s ({} failed, {:?})",
            file_count,
            start_time.elapsed().as_secs_f64(),
            failed,
            strategy
        );

        Ok(scans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::types::ScanConfiguration;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_worker_count_does_not_change_results() {
        let temp_dir = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for i in 0..12 {
            let path = temp_dir.path().join(format!("svc{:02}.log", i));
            fs::write(&path, format!("INFO boot\nERROR code {}\nINFO done\n", i).repeat(i + 1)).unwrap();
            paths.push(path);
        }
        paths.push(temp_dir.path().join("missing.log"));

        let mut config = ScanConfiguration::new(temp_dir.path(), vec!["ERROR".to_string()]);
        config.context_lines = 1;
        let matcher = PatternMatcher::new(&config);

        let one = matcher.scan_paths(paths.clone(), 1).unwrap();
        let many = matcher.scan_paths(paths, 5).unwrap();

        assert_eq!(one, many);
        assert_eq!(one.len(), 13);
        assert_eq!(one[3].hits(), 4);
        assert!(matches!(one[12], FileScan::Failed { .. }));
    }
}
