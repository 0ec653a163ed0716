use std::fs::{create_dir_all, write};
use std::sync::{Arc, Mutex};

use kendra_loader_core::clean::{clean, remove_files};
use kendra_loader_core::LoaderError;
use tempfile::tempdir;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() <= tracing::Level::INFO {
            self.events.lock().unwrap().push(format!("{:?}", event));
        }
    }
}

#[test]
fn test_clean_removes_files_and_is_idempotent() {
    let tmp = tempdir().unwrap();
    let content = tmp.path().join("content");
    create_dir_all(&content).unwrap();
    for name in ["a.txt", "a.txt.metadata.json", "b.txt"] {
        write(content.join(name), "x").unwrap();
    }

    let first = clean(&content).expect("First clean should succeed");
    assert_eq!(first.found, 3);
    assert_eq!(first.removed, 3);
    assert!(first.is_success());
    assert_eq!(std::fs::read_dir(&content).unwrap().count(), 0);

    let second = clean(&content).expect("Second clean should succeed");
    assert_eq!(second.found, 0);
    assert_eq!(second.removed, 0);
    assert!(second.is_success());
}

#[test]
fn test_clean_leaves_subdirectories() {
    let tmp = tempdir().unwrap();
    let content = tmp.path().join("content");
    create_dir_all(content.join("keep")).unwrap();
    write(content.join("keep/inner.txt"), "x").unwrap();
    write(content.join("top.txt"), "x").unwrap();

    let report = clean(&content).unwrap();

    assert_eq!(report.removed, 1);
    assert!(content.join("keep/inner.txt").exists());
    assert!(!content.join("top.txt").exists());
}

#[test]
fn test_clean_large_directory_logs_every_hundred_removals() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let tmp = tempdir().unwrap();
    for i in 0..250 {
        write(tmp.path().join(format!("f{i}.txt")), "x").unwrap();
    }
    let report = clean(tmp.path()).unwrap();
    assert_eq!(report.removed, 250);

    let event_msgs = events.lock().unwrap();
    assert!(event_msgs[0].contains("Found 250 files to clean"), "got: {:?}", event_msgs);
    let progress: Vec<_> = event_msgs
        .iter()
        .filter(|m| m.contains("Removed"))
        .collect();
    assert_eq!(progress.len(), 2, "got: {:?}", progress);
    assert!(progress[0].contains("Removed 100 files."));
    assert!(progress[1].contains("Removed 200 files."));
}

#[test]
fn test_clean_records_vanished_file_and_keeps_going() {
    let tmp = tempdir().unwrap();
    write(tmp.path().join("a.txt"), "x").unwrap();
    write(tmp.path().join("c.txt"), "x").unwrap();
    let listing = vec![
        "a.txt".to_string(),
        "gone.txt".to_string(),
        "c.txt".to_string(),
    ];

    let report = remove_files(tmp.path(), listing);

    assert_eq!(report.found, 3);
    assert_eq!(report.removed, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].file, "gone.txt");
    assert!(matches!(report.failures[0].error, LoaderError::FileSystem { .. }));
    assert!(!tmp.path().join("a.txt").exists());
    assert!(!tmp.path().join("c.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_clean_read_only_directory_reports_every_file() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempdir().unwrap();
    let content = tmp.path().join("content");
    create_dir_all(&content).unwrap();
    write(content.join("a.txt"), "x").unwrap();
    write(content.join("b.txt"), "x").unwrap();
    std::fs::set_permissions(&content, std::fs::Permissions::from_mode(0o555)).unwrap();

    // Privileged users bypass directory permissions.
    if write(content.join("write-check"), "x").is_ok() {
        std::fs::set_permissions(&content, std::fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let report = clean(&content).expect("Listing still works");
    std::fs::set_permissions(&content, std::fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(report.found, 2);
    assert_eq!(report.removed, 0);
    assert_eq!(report.failures.len(), 2);
    assert!(!report.is_success());
    assert!(content.join("a.txt").exists());
}

#[test]
fn test_clean_missing_directory_fails() {
    let tmp = tempdir().unwrap();
    let err = clean(&tmp.path().join("content")).unwrap_err();
    assert!(matches!(err, LoaderError::FileSystem { .. }), "got {err:?}");
}
