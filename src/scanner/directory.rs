use ignore::WalkBuilder;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

use super::types::ScanConfiguration;
use crate::error::ScanError;

/// Picks the log files of one directory that should be scanned.
///
/// Only the top level of the directory is considered. Names are yielded in
/// byte order of the file name so repeated runs see the same sequence.
#[derive(Debug, Clone)]
pub struct FileSelector {
    directory: PathBuf,
    name_include: Option<Regex>,
    name_exclude: Option<Regex>,
}

impl FileSelector {
    pub fn new(directory: impl Into<PathBuf>, name_include: Option<Regex>, name_exclude: Option<Regex>) -> Self {
        Self {
            directory: directory.into(),
            name_include,
            name_exclude,
        }
    }

    pub fn from_config(config: &ScanConfiguration) -> Self {
        Self::new(
            config.directory.clone(),
            config.name_include.clone(),
            config.name_exclude.clone(),
        )
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Lazily enumerate candidate files.
    ///
    /// A missing or unreadable directory is fatal; an entry that cannot be
    /// inspected is logged and skipped.
    pub fn select(&self) -> Result<impl Iterator<Item = PathBuf> + use<>, ScanError> {
        if !self.directory.is_dir() {
            return Err(ScanError::DirectoryNotFound(self.directory.clone()));
        }
        std::fs::read_dir(&self.directory).map_err(|source| ScanError::DirectoryUnreadable {
            path: self.directory.clone(),
            source,
        })?;

        let walker = WalkBuilder::new(&self.directory)
            .standard_filters(false)
            .follow_links(true)
            .max_depth(Some(1))
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let name_include = self.name_include.clone();
        let name_exclude = self.name_exclude.clone();

        Ok(walker.filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    return None;
                }
            };

            if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return None;
            }

            let name = entry.file_name().to_string_lossy();
            if name_include.as_ref().is_some_and(|re| !re.is_match(&name)) {
                trace!("{} does not match the log name filter", name);
                return None;
            }
            if name_exclude.as_ref().is_some_and(|re| re.is_match(&name)) {
                trace!("{} matches the log name exclusion", name);
                return None;
            }

            Some(entry.into_path())
        }))
    }
}
