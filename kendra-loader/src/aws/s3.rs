//! S3 `PutObject` client backing the bucket uploader.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use kendra_loader_core::contract::{ObjectStore, RemoteError};
use reqwest::Url;
use tracing::{debug, warn};

use super::credentials::AwsSession;
use super::extract_xml_value;
use super::sigv4::{self, uri_encode, SigningParams};

#[derive(Debug, Clone)]
pub struct S3Client {
    session: AwsSession,
}

impl S3Client {
    pub fn new(session: AwsSession) -> Self {
        Self { session }
    }

    /// Virtual-hosted URL on AWS, path-style when an endpoint override is set.
    pub fn object_url(&self, bucket: &str, key: &str) -> Result<Url, RemoteError> {
        let encoded_key = key
            .split('/')
            .map(uri_encode)
            .collect::<Vec<_>>()
            .join("/");
        let raw = match &self.session.endpoint_url {
            Some(endpoint) => format!("{}/{}/{}", endpoint, bucket, encoded_key),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                bucket, self.session.region, encoded_key
            ),
        };
        Ok(Url::parse(&raw)?)
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn upload_file(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<(), RemoteError> {
        let body = tokio::fs::read(local_path).await?;
        let url = self.object_url(bucket, key)?;
        let content_type = detect_content_type(key);

        let headers = sigv4::sign(&SigningParams {
            credentials: &self.session.credentials,
            region: &self.session.region,
            service: "s3",
            method: "PUT",
            url: &url,
            headers: &[("content-type", content_type)],
            payload: &body,
            now: Utc::now(),
        });

        debug!(bucket, key, bytes = body.len(), "PUT object");
        let mut request = self.session.http.put(url);
        for (name, value) in &headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.body(body).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        let code = extract_xml_value(&text, "Code").unwrap_or_else(|| status.to_string());
        warn!(bucket, key, %status, code = %code, "PUT object rejected");
        Err(format!("S3 PutObject failed ({status}): {code}").into())
    }
}

/// MIME type from the file extension; metadata sidecars are JSON.
fn detect_content_type(key: &str) -> &'static str {
    match key.rsplit('.').next() {
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        Some("html" | "htm") => "text/html",
        _ => "application/octet-stream",
    }
}
