//! Directory batch processor: normalizes every crawled document in a source
//! directory into a `.txt` body plus `.txt.metadata.json` file pair.
//!
//! The pass works from a snapshot of the source listing taken at the start.
//! A failure on one file is recorded in the [`PrepareReport`] and the pass
//! moves on to the next file; only an unreadable source directory or an
//! uncreatable destination aborts the whole pass.

use std::fs;
use std::path::Path;

use tracing::{debug, error, info};

use crate::config::MetadataDefaults;
use crate::error::{FileFailure, LoaderError};
use crate::listing::list_regular_files;
use crate::normalize::{normalize, output_names, parse_document};

/// Progress is logged each time this many files have been handled.
pub const PROGRESS_EVERY: usize = 100;

#[derive(Debug, Default)]
pub struct PrepareReport {
    /// Number of source files found in the listing snapshot.
    pub found: usize,
    /// Files whose body and metadata were both written.
    pub written: Vec<String>,
    pub failures: Vec<FileFailure>,
}

impl PrepareReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run the normalization pass from `source_dir` into `dest_dir`.
pub fn prepare(
    source_dir: &Path,
    dest_dir: &Path,
    defaults: &MetadataDefaults,
) -> Result<PrepareReport, LoaderError> {
    fs::create_dir_all(dest_dir).map_err(|e| {
        error!(error = ?e, path = %dest_dir.display(), "Failed to create destination directory");
        LoaderError::fs(dest_dir, e)
    })?;

    let files = list_regular_files(source_dir)?;
    info!(count = files.len(), "Found {} files to process", files.len());

    let mut report = PrepareReport {
        found: files.len(),
        ..Default::default()
    };

    for (index, file) in files.into_iter().enumerate() {
        match process_file(source_dir, dest_dir, &file, defaults) {
            Ok(()) => {
                debug!(file = %file, "Prepared document");
                report.written.push(file);
            }
            Err(e) => {
                error!(file = %file, error = %e, "Failed to prepare document");
                report.failures.push(FileFailure { file, error: e });
            }
        }
        let processed = index + 1;
        if processed % PROGRESS_EVERY == 0 {
            info!(processed, "processed {} files.", processed);
        }
    }

    Ok(report)
}

/// Read, normalize and persist a single source file.
pub fn process_file(
    source_dir: &Path,
    dest_dir: &Path,
    file: &str,
    defaults: &MetadataDefaults,
) -> Result<(), LoaderError> {
    let source_path = source_dir.join(file);
    let bytes = fs::read(&source_path).map_err(|e| LoaderError::fs(&source_path, e))?;
    let record = normalize(parse_document(&bytes)?, defaults);

    let (body_name, metadata_name) = output_names(file);
    let body_path = dest_dir.join(body_name);
    fs::write(&body_path, record.body.as_bytes()).map_err(|e| LoaderError::fs(&body_path, e))?;

    let metadata_path = dest_dir.join(metadata_name);
    fs::write(&metadata_path, record.metadata_json()?)
        .map_err(|e| LoaderError::fs(&metadata_path, e))?;
    Ok(())
}
