//! HTTP client for the external intent endpoint used by `--operation eve`.
//!
//! The endpoint receives `{"query": "<question>"}` and answers either with a
//! JSON array or with an object holding a `results` array. String entries are
//! used as-is, anything else is kept as its compact JSON encoding.

use async_trait::async_trait;
use kendra_loader_core::contract::{IntentClient, RemoteError};
use serde_json::{json, Value};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HttpIntentClient {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpIntentClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl IntentClient for HttpIntentClient {
    async fn classify(&self, question: &str) -> Result<Vec<String>, RemoteError> {
        debug!(endpoint = %self.endpoint, "Classifying question");
        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "query": question }))
            .send()
            .await?
            .error_for_status()?;
        let body: Value = response.json().await?;
        Ok(parse_intent_answers(&body))
    }
}

/// Flatten an intent response into ranked answer strings.
pub fn parse_intent_answers(body: &Value) -> Vec<String> {
    let items = match body {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("results") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn accepts_arrays_and_results_objects() {
        assert_eq!(parse_intent_answers(&json!(["a", "b"])), vec!["a", "b"]);
        assert_eq!(
            parse_intent_answers(&json!({"results": ["x", {"title": "y"}, 3]})),
            vec!["x", r#"{"title":"y"}"#, "3"]
        );
        assert!(parse_intent_answers(&json!({"other": 1})).is_empty());
    }

    #[tokio::test]
    async fn posts_question_as_query_field() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/intent")
            .match_body(Matcher::Json(json!({"query": "where is the policy?"})))
            .with_status(200)
            .with_body(r#"{"results": ["policy.pdf", "handbook"]}"#)
            .create_async()
            .await;

        let client = HttpIntentClient::new(format!("{}/intent", server.url()));
        let answers = client.classify("where is the policy?").await.unwrap();

        assert_eq!(answers, vec!["policy.pdf", "handbook"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_errors_are_returned() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/intent")
            .with_status(500)
            .create_async()
            .await;

        let client = HttpIntentClient::new(format!("{}/intent", server.url()));
        assert!(client.classify("q").await.is_err());
    }
}
