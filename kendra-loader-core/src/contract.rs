#![allow(unused)]

//! # contract: collaborator interfaces consumed by the core
//!
//! The core never talks to a cloud service directly. Every remote effect goes
//! through one of the traits below, implemented for real by the CLI crate
//! (S3, Kendra, an HTTP intent endpoint) and by `mockall` mocks in tests.
//!
//! ## Mocking & Testing
//! - Traits are annotated with `automock` under `test` or the
//!   `test-export-mocks` feature, so dependents get `MockObjectStore`,
//!   `MockSearchClient` and `MockIntentClient` for their own tests.
//!
//! ## Error Handling
//! - Implementors return a boxed error; the core attaches the object key or
//!   question it was working on and converts it to a `LoaderError`.

use std::path::Path;

use async_trait::async_trait;
use mockall::{automock, predicate::*};

use crate::query::QueryRequest;

/// Boxed error returned by collaborator implementations.
pub type RemoteError = Box<dyn std::error::Error + Send + Sync>;

/// Object storage target for the bucket uploader.
///
/// Implementations read the local file themselves and overwrite any existing
/// object with the same key.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the file at `local_path` to `bucket` under `key`.
    async fn upload_file(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<(), RemoteError>;
}

/// Managed search index that answers a [`QueryRequest`] with the raw service
/// response document.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn query(&self, request: &QueryRequest) -> Result<serde_json::Value, RemoteError>;
}

/// External intent-classification endpoint used by the `eve` test-case mode.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait IntentClient: Send + Sync {
    /// Ranked answers for `question`, best first.
    async fn classify(&self, question: &str) -> Result<Vec<String>, RemoteError>;
}
