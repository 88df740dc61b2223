use anyhow::{Context, Result};
use std::fs::DirBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};

/// File name of a persisted report
pub fn report_file_name(hostname: &str, total_hits: usize, scanned_dir: &Path) -> String {
    let flattened = scanned_dir
        .to_string_lossy()
        .replace(std::path::MAIN_SEPARATOR, "_");
    format!("LogMonitor-{}_(hits:{})_{}", hostname, total_hits, flattened)
}

/// Write `text` to `<output_dir>/<day_stamp>/<file_name>`.
///
/// A missing output directory is created with mode 0700, the dated
/// directory below it with 0777.
pub fn persist(output_dir: &Path, day_stamp: &str, file_name: &str, text: &str) -> Result<PathBuf> {
    if !output_dir.exists() {
        create_dir(output_dir, 0o700)
            .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;
    }

    let date_dir = output_dir.join(day_stamp);
    if !date_dir.exists() {
        create_dir(&date_dir, 0o777)
            .with_context(|| format!("Failed to create report directory: {}", date_dir.display()))?;
        #[cfg(unix)]
        std::fs::set_permissions(&date_dir, std::fs::Permissions::from_mode(0o777))
            .with_context(|| format!("Failed to set permissions on {}", date_dir.display()))?;
    }

    let path = date_dir.join(file_name);
    std::fs::write(&path, text).with_context(|| format!("Failed to write report: {}", path.display()))?;
    debug!("Report written to {}", path.display());
    Ok(path)
}

fn create_dir(path: &Path, mode: u32) -> std::io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(mode);
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_name_flattens_scanned_dir() {
        let name = report_file_name("web01", 7, Path::new("/var/log/app/20240101"));
        assert_eq!(name, "LogMonitor-web01_(hits:7)__var_log_app_20240101");
    }

    #[test]
    fn test_persist_creates_dated_directory() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("reports");

        let path = persist(&out, "20240101", "report.txt", "hello\n").unwrap();

        assert_eq!(path, out.join("20240101").join("report.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_persist_sets_directory_modes() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("reports");
        persist(&out, "20240101", "report.txt", "x").unwrap();

        let out_mode = std::fs::metadata(&out).unwrap().permissions().mode() & 0o777;
        let day_mode = std::fs::metadata(out.join("20240101")).unwrap().permissions().mode() & 0o777;
        assert_eq!(out_mode & 0o077, 0);
        assert_eq!(day_mode, 0o777);
    }

    #[test]
    fn test_persist_fails_when_output_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        assert!(persist(&blocker, "20240101", "report.txt", "x").is_err());
    }
}
