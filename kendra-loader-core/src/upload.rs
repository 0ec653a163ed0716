//! Bucket uploader: pushes every regular file of a directory to an
//! [`ObjectStore`] through a bounded pool of worker tasks.
//!
//! # Pool
//! - One job per file is queued up front on an unbounded channel; the queue is
//!   closed before any worker starts, so workers stop when it drains.
//! - `workers` tasks share the receiving half and pull jobs one at a time.
//! - Each store call runs under a timeout and is retried up to `max_attempts`
//!   times, immediately, with no backoff.
//! - The call returns after every worker has joined, with one
//!   [`UploadOutcome`] per file in listing order.
//!
//! The object key is always the local file name: no prefix, no directory
//! mapping, existing objects are overwritten.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::{BucketTarget, UploadOptions};
use crate::contract::ObjectStore;
use crate::error::LoaderError;
use crate::listing::list_regular_files;

/// Result of uploading one file.
#[derive(Debug)]
pub struct UploadOutcome {
    pub file: String,
    pub key: String,
    pub attempts: u32,
    pub result: Result<(), LoaderError>,
}

#[derive(Debug, Default)]
pub struct UploadReport {
    pub outcomes: Vec<UploadOutcome>,
}

impl UploadReport {
    pub fn uploaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &UploadOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

type Job = (usize, String);

/// Upload the regular files of `source_dir` to `target.bucket`.
pub async fn upload<S>(
    store: Arc<S>,
    source_dir: &Path,
    target: &BucketTarget,
    options: &UploadOptions,
) -> Result<UploadReport, LoaderError>
where
    S: ObjectStore + ?Sized + 'static,
{
    if options.workers == 0 {
        return Err(LoaderError::Config(
            "upload.workers must be at least 1".to_string(),
        ));
    }

    let files = list_regular_files(source_dir)?;
    info!(
        count = files.len(),
        bucket = %target.bucket,
        "Found {} files to upload",
        files.len()
    );
    if files.is_empty() {
        return Ok(UploadReport::default());
    }

    let total = files.len();
    let (tx, rx) = mpsc::unbounded_channel::<Job>();
    for job in files.into_iter().enumerate() {
        tx.send(job)
            .map_err(|e| LoaderError::Worker(format!("upload queue closed early: {e}")))?;
    }
    drop(tx);

    let queue = Arc::new(Mutex::new(rx));
    let source_dir = Arc::new(source_dir.to_path_buf());
    let bucket: Arc<str> = Arc::from(target.bucket.as_str());
    let width = options.workers.min(total);

    let handles = (0..width)
        .map(|worker| {
            tokio::spawn(run_worker(
                worker,
                queue.clone(),
                store.clone(),
                source_dir.clone(),
                bucket.clone(),
                options.timeout(),
                options.max_attempts,
            ))
        })
        .collect::<Vec<_>>();

    let mut indexed = Vec::with_capacity(total);
    for joined in join_all(handles).await {
        match joined {
            Ok(batch) => indexed.extend(batch),
            Err(e) => {
                error!(error = %e, "Upload worker did not complete");
                return Err(LoaderError::Worker(e.to_string()));
            }
        }
    }
    indexed.sort_by_key(|(index, _)| *index);

    let report = UploadReport {
        outcomes: indexed.into_iter().map(|(_, outcome)| outcome).collect(),
    };
    info!(
        uploaded = report.uploaded(),
        failed = total - report.uploaded(),
        "Upload pass complete"
    );
    Ok(report)
}

async fn run_worker<S>(
    worker: usize,
    queue: Arc<Mutex<mpsc::UnboundedReceiver<Job>>>,
    store: Arc<S>,
    source_dir: Arc<PathBuf>,
    bucket: Arc<str>,
    timeout: Duration,
    max_attempts: u32,
) -> Vec<(usize, UploadOutcome)>
where
    S: ObjectStore + ?Sized,
{
    let mut done = Vec::new();
    loop {
        let next = queue.lock().await.recv().await;
        let Some((index, file)) = next else {
            break;
        };
        let outcome =
            upload_one(store.as_ref(), &source_dir, &bucket, file, timeout, max_attempts).await;
        done.push((index, outcome));
    }
    debug!(worker, handled = done.len(), "Upload worker drained queue");
    done
}

async fn upload_one<S>(
    store: &S,
    source_dir: &Path,
    bucket: &str,
    file: String,
    timeout: Duration,
    max_attempts: u32,
) -> UploadOutcome
where
    S: ObjectStore + ?Sized,
{
    let path = source_dir.join(&file);
    let key = file.clone();
    let allowed = max_attempts.max(1);
    let mut attempts = 0;

    let result = loop {
        attempts += 1;
        let message = match tokio::time::timeout(timeout, store.upload_file(&path, bucket, &key))
            .await
        {
            Ok(Ok(())) => break Ok(()),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {}s", timeout.as_secs()),
        };
        if attempts >= allowed {
            error!(key = %key, attempts, error = %message, "Upload failed");
            break Err(LoaderError::remote(&key, message));
        }
        warn!(key = %key, attempt = attempts, error = %message, "Upload attempt failed, retrying");
    };

    if result.is_ok() {
        debug!(key = %key, bucket, attempts, "Uploaded file");
    }
    UploadOutcome {
        file,
        key,
        attempts,
        result,
    }
}
