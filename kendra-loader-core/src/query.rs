//! Search index query model.
//!
//! [`QueryRequest`] serializes to the JSON body the search index expects:
//!
//! ```json
//! {
//!   "IndexId": "...",
//!   "QueryText": "...",
//!   "QueryResultTypeFilter": "DOCUMENT",
//!   "PageSize": 10,
//!   "SortingConfiguration": {"DocumentAttributeKey": "_last_updated_at", "SortOrder": "ASC"},
//!   "SpellCorrectionConfiguration": {"IncludeQuerySpellCheckSuggestions": false}
//! }
//! ```

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::contract::SearchClient;
use crate::error::LoaderError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryRequest {
    pub index_id: String,
    pub query_text: String,
    pub query_result_type_filter: String,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorting_configuration: Option<SortingConfiguration>,
    pub spell_correction_configuration: SpellCorrectionConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SortingConfiguration {
    pub document_attribute_key: String,
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpellCorrectionConfiguration {
    pub include_query_spell_check_suggestions: bool,
}

impl QueryRequest {
    /// Document-only query, 10 results, oldest `_last_updated_at` first,
    /// without spell-check suggestions.
    pub fn simple(index_id: &str, query_text: &str) -> Self {
        Self {
            index_id: index_id.to_string(),
            query_text: query_text.to_string(),
            query_result_type_filter: "DOCUMENT".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            sorting_configuration: Some(SortingConfiguration {
                document_attribute_key: "_last_updated_at".to_string(),
                sort_order: SortOrder::Asc,
            }),
            spell_correction_configuration: SpellCorrectionConfiguration {
                include_query_spell_check_suggestions: false,
            },
        }
    }
}

/// Identifies the index a query tool run talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTarget {
    pub index_id: String,
    pub region: String,
    pub profile: Option<String>,
}

/// Issue one simple query and return the raw response document.
pub async fn send_simple_query<C>(
    client: &C,
    index_id: &str,
    query_text: &str,
) -> Result<Value, LoaderError>
where
    C: SearchClient + ?Sized,
{
    info!(index_id, query_text, "Sending simple query");
    let request = QueryRequest::simple(index_id, query_text);
    match client.query(&request).await {
        Ok(response) => {
            info!(
                results = result_items(&response).len(),
                "Query returned"
            );
            Ok(response)
        }
        Err(e) => {
            error!(error = %e, query_text, "Query failed");
            Err(LoaderError::remote(query_text, e.to_string()))
        }
    }
}

fn result_items(response: &Value) -> &[Value] {
    response
        .get("ResultItems")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Labels for the first `limit` result items: the document title text, or the
/// document id when the title is absent.
pub fn top_results(response: &Value, limit: usize) -> Vec<String> {
    result_items(response)
        .iter()
        .filter_map(|item| {
            item.pointer("/DocumentTitle/Text")
                .and_then(Value::as_str)
                .or_else(|| item.get("DocumentId").and_then(Value::as_str))
                .map(str::to_string)
        })
        .take(limit)
        .collect()
}
