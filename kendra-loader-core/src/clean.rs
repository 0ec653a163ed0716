//! Directory cleaner: removes every regular file directly under a directory.

use std::fs;
use std::path::Path;

use tracing::{error, info};

use crate::error::{FileFailure, LoaderError};
use crate::listing::list_regular_files;
use crate::prepare::PROGRESS_EVERY;

#[derive(Debug, Default)]
pub struct CleanReport {
    pub found: usize,
    pub removed: usize,
    pub failures: Vec<FileFailure>,
}

impl CleanReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Delete the regular files of `directory`, one at a time.
///
/// Subdirectories are left alone. Files that cannot be removed are reported in
/// [`CleanReport::failures`] and do not stop the pass.
pub fn clean(directory: &Path) -> Result<CleanReport, LoaderError> {
    let files = list_regular_files(directory)?;
    info!(count = files.len(), "Found {} files to clean", files.len());
    Ok(remove_files(directory, files))
}

/// Remove each named file under `directory`. A name that no longer exists
/// or cannot be removed becomes a [`FileFailure`].
pub fn remove_files(directory: &Path, files: Vec<String>) -> CleanReport {
    let mut report = CleanReport {
        found: files.len(),
        ..Default::default()
    };
    for file in files {
        let path = directory.join(&file);
        match fs::remove_file(&path) {
            Ok(()) => {
                report.removed += 1;
                if report.removed % PROGRESS_EVERY == 0 {
                    info!(removed = report.removed, "Removed {} files.", report.removed);
                }
            }
            Err(e) => {
                error!(error = ?e, path = %path.display(), "Failed to remove file");
                report.failures.push(FileFailure {
                    file,
                    error: LoaderError::fs(path, e),
                });
            }
        }
    }
    report
}
