/// `load_config` module: reads the optional YAML settings file into a [`LoaderConfig`].
///
/// Every section is optional. Missing keys keep the built-in defaults
/// (`raw/` → `content/`, 10 upload workers, placeholder metadata values), so an
/// empty file is a valid configuration.
///
/// ```yaml
/// source_dir: raw
/// content_dir: content
/// upload:
///   workers: 10
///   timeout_secs: 300
///   max_attempts: 3
/// metadata:
///   category: news
///   version: "1"
/// ```
///
/// # Errors
/// Unreadable files and malformed YAML are reported as `anyhow::Error` with the
/// path in the message, and logged before returning.
use anyhow::Result;
use kendra_loader_core::config::LoaderConfig;
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<LoaderConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    if config_content.trim().is_empty() {
        return Ok(LoaderConfig::default());
    }

    let config: LoaderConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if config.upload.workers == 0 {
        error!(config_path = ?path_ref, "upload.workers must be at least 1");
        return Err(anyhow::anyhow!("upload.workers must be at least 1"));
    }

    Ok(config)
}

/// Config from `path` when given, defaults otherwise.
pub fn load_or_default(path: Option<&Path>) -> Result<LoaderConfig> {
    let config = match path {
        Some(path) => load_config(path)?,
        None => LoaderConfig::default(),
    };
    config.trace_loaded();
    Ok(config)
}
