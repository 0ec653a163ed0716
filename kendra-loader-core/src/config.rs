use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Settings for the loader passes. Built once by the CLI and passed down.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directory holding the crawled JSON documents.
    pub source_dir: PathBuf,
    /// Directory receiving the `.txt` / `.txt.metadata.json` pairs.
    pub content_dir: PathBuf,
    pub upload: UploadOptions,
    pub metadata: MetadataDefaults,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("raw"),
            content_dir: PathBuf::from("content"),
            upload: UploadOptions::default(),
            metadata: MetadataDefaults::default(),
        }
    }
}

impl LoaderConfig {
    pub fn trace_loaded(&self) {
        info!(
            source_dir = %self.source_dir.display(),
            content_dir = %self.content_dir.display(),
            workers = self.upload.workers,
            "Loaded LoaderConfig"
        );
        debug!(?self, "LoaderConfig loaded (full debug)");
    }
}

/// Worker pool settings for the bucket uploader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadOptions {
    /// Number of concurrent upload workers.
    pub workers: usize,
    /// Per-call timeout, in seconds.
    pub timeout_secs: u64,
    /// Attempts per file, including the first one.
    pub max_attempts: u32,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            workers: 10,
            timeout_secs: 300,
            max_attempts: 3,
        }
    }
}

impl UploadOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Values for the reserved metadata attributes that are not derived from the
/// source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataDefaults {
    pub category: String,
    pub last_updated_at: String,
    pub version: String,
    pub view_count: u64,
}

impl Default for MetadataDefaults {
    fn default() -> Self {
        Self {
            category: String::new(),
            last_updated_at: "ISO 8601 encoded string".to_string(),
            version: "file version".to_string(),
            view_count: 0,
        }
    }
}

/// Remote bucket addressed by name, region and credential profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketTarget {
    pub bucket: String,
    pub region: String,
    pub profile: Option<String>,
}

impl BucketTarget {
    pub fn trace_loaded(&self) {
        info!(
            bucket = %self.bucket,
            region = %self.region,
            profile = self.profile.as_deref().unwrap_or("<env>"),
            "Loaded BucketTarget"
        );
    }
}
