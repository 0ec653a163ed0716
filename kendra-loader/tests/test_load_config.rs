use kendra_loader::load_config::{load_config, load_or_default};
use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_overrides_selected_keys() {
    let config_yaml = r#"
source_dir: ./crawl
upload:
  workers: 4
  max_attempts: 5
metadata:
  category: news
  view_count: 7
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.source_dir, PathBuf::from("./crawl"));
    assert_eq!(config.content_dir, PathBuf::from("content"));
    assert_eq!(config.upload.workers, 4);
    assert_eq!(config.upload.max_attempts, 5);
    assert_eq!(config.upload.timeout_secs, 300);
    assert_eq!(config.metadata.category, "news");
    assert_eq!(config.metadata.view_count, 7);
    assert_eq!(config.metadata.version, "file version");
}

#[test]
fn test_load_config_empty_file_is_all_defaults() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "").unwrap();

    let config = load_config(config_file.path()).expect("Empty config should load");
    assert_eq!(config.upload.workers, 10);
    assert_eq!(config.source_dir, PathBuf::from("raw"));
}

#[test]
fn test_load_config_rejects_malformed_yaml() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "upload: [not, a, map").unwrap();

    let err = load_config(config_file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config YAML"), "got {err}");
}

#[test]
fn test_load_config_rejects_zero_workers() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "upload:\n  workers: 0\n").unwrap();

    assert!(load_config(config_file.path()).is_err());
}

#[test]
fn test_load_config_missing_file_fails() {
    let err = load_config("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"), "got {err}");
}

#[test]
fn test_load_or_default_without_path() {
    let config = load_or_default(None).unwrap();
    assert_eq!(config.content_dir, PathBuf::from("content"));
}
