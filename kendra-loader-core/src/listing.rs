//! Directory snapshots shared by the prepare, upload and clean passes.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::LoaderError;

/// Names of the regular files directly under `dir`, in the order the
/// filesystem returns them. Subdirectories are skipped, nothing is recursed.
/// Names that are not valid UTF-8 cannot become object keys and are skipped
/// with a warning.
pub fn list_regular_files(dir: &Path) -> Result<Vec<String>, LoaderError> {
    let entries = fs::read_dir(dir).map_err(|e| LoaderError::fs(dir, e))?;
    let mut names = Vec::new();
    for entry_res in entries {
        let entry = entry_res.map_err(|e| LoaderError::fs(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            debug!(path = %path.display(), "Skipping non-regular entry");
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!(name = ?raw, dir = %dir.display(), "Skipping file with non UTF-8 name"),
        }
    }
    Ok(names)
}
