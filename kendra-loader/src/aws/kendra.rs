//! Kendra `Query` client (JSON 1.1 protocol).

use async_trait::async_trait;
use chrono::Utc;
use kendra_loader_core::contract::{RemoteError, SearchClient};
use kendra_loader_core::query::QueryRequest;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

use super::credentials::AwsSession;
use super::sigv4::{self, SigningParams};

const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const QUERY_TARGET: &str = "AWSKendraFrontendService.Query";

#[derive(Debug, Clone)]
pub struct KendraClient {
    session: AwsSession,
}

impl KendraClient {
    pub fn new(session: AwsSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl SearchClient for KendraClient {
    async fn query(&self, request: &QueryRequest) -> Result<Value, RemoteError> {
        let payload = serde_json::to_vec(request)?;
        let url = Url::parse(&format!("{}/", self.session.service_url("kendra")))?;

        let headers = sigv4::sign(&SigningParams {
            credentials: &self.session.credentials,
            region: &self.session.region,
            service: "kendra",
            method: "POST",
            url: &url,
            headers: &[("content-type", CONTENT_TYPE), ("x-amz-target", QUERY_TARGET)],
            payload: &payload,
            now: Utc::now(),
        });

        debug!(index_id = %request.index_id, "POST Query");
        let mut builder = self.session.http.post(url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let response = builder.body(payload).send().await?;

        let status = response.status();
        if status.is_success() {
            let body: Value = response
                .json()
                .await
                .map_err(|e| format!("Kendra Query returned an undecodable body: {e}"))?;
            return Ok(body);
        }
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let kind = body
            .get("__type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .rsplit('#')
            .next()
            .unwrap_or_default()
            .to_string();
        let message = body
            .get("message")
            .or_else(|| body.get("Message"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        warn!(%status, kind = %kind, "Kendra query rejected");
        Err(format!("Kendra Query failed ({status}): {kind} {message}")
            .trim_end()
            .to_string()
            .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::credentials::AwsCredentials;
    use mockito::Matcher;
    use serde_json::json;

    fn client(endpoint: String) -> KendraClient {
        KendraClient::new(
            AwsSession::with_credentials(
                AwsCredentials {
                    access_key_id: "AKIDTEST".into(),
                    secret_access_key: "secret".into(),
                    session_token: Some("token".into()),
                },
                "eu-west-1",
            )
            .with_endpoint_url(Some(endpoint)),
        )
    }

    #[tokio::test]
    async fn posts_query_document_and_returns_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-amz-target", QUERY_TARGET)
            .match_header("content-type", CONTENT_TYPE)
            .match_header("x-amz-security-token", "token")
            .match_body(Matcher::PartialJson(json!({
                "IndexId": "idx",
                "QueryText": "rust",
                "PageSize": 10
            })))
            .with_status(200)
            .with_body(r#"{"ResultItems":[{"DocumentId":"d1"}],"TotalNumberOfResults":1}"#)
            .create_async()
            .await;

        let response = client(server.url())
            .query(&QueryRequest::simple("idx", "rust"))
            .await
            .unwrap();

        assert_eq!(response["TotalNumberOfResults"], 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn undecodable_success_body_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let err = client(server.url())
            .query(&QueryRequest::simple("idx", "rust"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("undecodable body"), "got {err}");
    }

    #[tokio::test]
    async fn service_errors_carry_the_exception_name() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(400)
            .with_body(r#"{"__type":"com.amazonaws.kendra#ResourceNotFoundException","message":"no index"}"#)
            .create_async()
            .await;

        let err = client(server.url())
            .query(&QueryRequest::simple("missing", "rust"))
            .await
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("ResourceNotFoundException"), "got {text}");
        assert!(text.contains("no index"), "got {text}");
    }
}
