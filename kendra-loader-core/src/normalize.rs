//! Record normalizer: one crawled JSON document in, one (body, metadata) pair out.
//!
//! The metadata layout is the document metadata format read by the search
//! index when it ingests `X.txt` together with `X.txt.metadata.json`: a fixed
//! header (`Title`, `ContentType`, `DocumentId`) and an `Attributes` map made
//! of reserved `_`-prefixed keys followed by custom passthrough fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::MetadataDefaults;
use crate::error::LoaderError;

/// Attributes every source document must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 15] = [
    "text",
    "title",
    "uuid",
    "published",
    "url",
    "organizations",
    "author",
    "entities",
    "locations",
    "language",
    "persons",
    "external_links",
    "crawled",
    "highlightTitle",
    "highlightText",
];

pub const CONTENT_TYPE: &str = "JSON";

/// One crawled document as read from the source directory.
///
/// Only the fields that feed the metadata header or the reserved attributes
/// must be strings; the rest pass through with whatever JSON type they have.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceDocument {
    pub text: String,
    pub title: String,
    pub uuid: String,
    pub published: String,
    pub url: String,
    pub organizations: Value,
    pub author: Value,
    pub entities: Value,
    pub locations: Value,
    pub language: Value,
    pub persons: Value,
    pub external_links: Value,
    pub crawled: Value,
    #[serde(rename = "highlightTitle")]
    pub highlight_title: Value,
    #[serde(rename = "highlightText")]
    pub highlight_text: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "ContentType")]
    pub content_type: String,
    #[serde(rename = "DocumentId")]
    pub document_id: String,
    #[serde(rename = "Attributes")]
    pub attributes: DocumentAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAttributes {
    #[serde(rename = "_category")]
    pub category: String,
    #[serde(rename = "_created_at")]
    pub created_at: String,
    #[serde(rename = "_last_updated_at")]
    pub last_updated_at: String,
    #[serde(rename = "_source_uri")]
    pub source_uri: String,
    #[serde(rename = "_version")]
    pub version: String,
    #[serde(rename = "_view_count")]
    pub view_count: u64,
    pub published: String,
    pub organizations: Value,
    pub author: Value,
    pub entities: Value,
    pub url: String,
    pub locations: Value,
    pub language: Value,
    pub persons: Value,
    pub external_links: Value,
    pub crawled: Value,
    #[serde(rename = "highlightTitle")]
    pub highlight_title: Value,
    #[serde(rename = "highlightText")]
    pub highlight_text: Value,
}

/// The (body, metadata) pair derived from one source document.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub body: String,
    pub metadata: DocumentMetadata,
}

impl NormalizedRecord {
    /// Compact JSON form written to `X.txt.metadata.json`.
    pub fn metadata_json(&self) -> Result<String, LoaderError> {
        Ok(serde_json::to_string(&self.metadata)?)
    }
}

/// Parse raw bytes into a [`SourceDocument`], naming the first absent field.
pub fn parse_document(bytes: &[u8]) -> Result<SourceDocument, LoaderError> {
    let value: Value = serde_json::from_slice(bytes)?;
    document_from_value(value)
}

/// Validate presence of every required attribute, then deserialize.
pub fn document_from_value(value: Value) -> Result<SourceDocument, LoaderError> {
    let object = value.as_object().ok_or_else(|| {
        LoaderError::Parse {
            source: serde::de::Error::custom("source document is not a JSON object"),
        }
    })?;
    if let Some(field) = REQUIRED_FIELDS
        .iter()
        .copied()
        .find(|f| !object.contains_key(*f))
    {
        return Err(LoaderError::MissingField { field });
    }
    Ok(serde_json::from_value(value)?)
}

/// Turn a source document into its normalized record. Pure.
pub fn normalize(doc: SourceDocument, defaults: &MetadataDefaults) -> NormalizedRecord {
    let metadata = DocumentMetadata {
        title: doc.title,
        content_type: CONTENT_TYPE.to_string(),
        document_id: doc.uuid,
        attributes: DocumentAttributes {
            category: defaults.category.clone(),
            created_at: doc.published.clone(),
            last_updated_at: defaults.last_updated_at.clone(),
            source_uri: doc.url.clone(),
            version: defaults.version.clone(),
            view_count: defaults.view_count,
            published: doc.published,
            organizations: doc.organizations,
            author: doc.author,
            entities: doc.entities,
            url: doc.url,
            locations: doc.locations,
            language: doc.language,
            persons: doc.persons,
            external_links: doc.external_links,
            crawled: doc.crawled,
            highlight_title: doc.highlight_title,
            highlight_text: doc.highlight_text,
        },
    };
    NormalizedRecord {
        body: doc.text,
        metadata,
    }
}

/// Output file names for a source file: `X.txt` and `X.txt.metadata.json`,
/// where `X` is everything before the first `.` of `file_name`.
pub fn output_names(file_name: &str) -> (String, String) {
    let stem = file_name.split('.').next().unwrap_or(file_name);
    let body_name = format!("{stem}.txt");
    let metadata_name = format!("{body_name}.metadata.json");
    (body_name, metadata_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "text": "hello",
            "title": "T",
            "uuid": "u1",
            "published": "2020-01-01",
            "url": "http://x",
            "organizations": [],
            "author": "A",
            "entities": {"persons": [], "organizations": [], "locations": []},
            "locations": [],
            "language": "en",
            "persons": ["p"],
            "external_links": [],
            "crawled": "2020-01-02",
            "highlightTitle": "",
            "highlightText": ""
        })
    }

    #[test]
    fn document_id_and_title_come_from_the_source() {
        let doc = document_from_value(sample()).unwrap();
        let record = normalize(doc, &MetadataDefaults::default());
        assert_eq!(record.body, "hello");
        assert_eq!(record.metadata.document_id, "u1");
        assert_eq!(record.metadata.title, "T");
        assert_eq!(record.metadata.content_type, "JSON");
        assert_eq!(record.metadata.attributes.created_at, "2020-01-01");
        assert_eq!(record.metadata.attributes.source_uri, "http://x");
        assert_eq!(record.metadata.attributes.persons, json!(["p"]));
    }

    #[test]
    fn reserved_attributes_use_configured_defaults() {
        let defaults = MetadataDefaults {
            category: "news".into(),
            last_updated_at: "2024-01-01T00:00:00Z".into(),
            version: "7".into(),
            view_count: 3,
        };
        let record = normalize(document_from_value(sample()).unwrap(), &defaults);
        let attrs = &record.metadata.attributes;
        assert_eq!(attrs.category, "news");
        assert_eq!(attrs.last_updated_at, "2024-01-01T00:00:00Z");
        assert_eq!(attrs.version, "7");
        assert_eq!(attrs.view_count, 3);
    }

    #[test]
    fn metadata_json_has_every_reserved_and_passthrough_key() {
        let record = normalize(
            document_from_value(sample()).unwrap(),
            &MetadataDefaults::default(),
        );
        let parsed: Value = serde_json::from_str(&record.metadata_json().unwrap()).unwrap();
        let attrs = parsed["Attributes"].as_object().unwrap();
        for key in [
            "_category",
            "_created_at",
            "_last_updated_at",
            "_source_uri",
            "_version",
            "_view_count",
            "published",
            "organizations",
            "author",
            "entities",
            "url",
            "locations",
            "language",
            "persons",
            "external_links",
            "crawled",
            "highlightTitle",
            "highlightText",
        ] {
            assert!(attrs.contains_key(key), "missing attribute {key}");
        }
        assert_eq!(attrs.len(), 18);
        assert_eq!(parsed["Attributes"]["_view_count"], json!(0));
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let mut value = sample();
        value.as_object_mut().unwrap().remove("crawled");
        let err = document_from_value(value).unwrap_err();
        assert!(
            matches!(err, LoaderError::MissingField { field: "crawled" }),
            "got {err:?}"
        );
    }

    #[test]
    fn first_missing_field_wins() {
        let err = parse_document(br#"{"title": "only"}"#).unwrap_err();
        assert!(
            matches!(err, LoaderError::MissingField { field: "text" }),
            "got {err:?}"
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_document(b"{not json").unwrap_err();
        assert!(matches!(err, LoaderError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn passthrough_attributes_keep_their_json_type() {
        let mut value = sample();
        value["author"] = Value::Null;
        value["language"] = json!(["en", "nl"]);
        value["crawled"] = json!(1700000000);
        let record = normalize(
            document_from_value(value).expect("null author should be accepted"),
            &MetadataDefaults::default(),
        );

        let parsed: Value = serde_json::from_str(&record.metadata_json().unwrap()).unwrap();
        assert!(parsed["Attributes"].as_object().unwrap().contains_key("author"));
        assert_eq!(parsed["Attributes"]["author"], Value::Null);
        assert_eq!(parsed["Attributes"]["language"], json!(["en", "nl"]));
        assert_eq!(parsed["Attributes"]["crawled"], json!(1700000000));
    }

    #[test]
    fn wrong_scalar_type_is_a_parse_error() {
        let mut value = sample();
        value["uuid"] = json!(42);
        let err = document_from_value(value).unwrap_err();
        assert!(matches!(err, LoaderError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn non_object_document_is_a_parse_error() {
        let err = parse_document(b"[1, 2]").unwrap_err();
        assert!(matches!(err, LoaderError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn output_names_strip_everything_after_the_first_dot() {
        assert_eq!(
            output_names("foo.json"),
            ("foo.txt".to_string(), "foo.txt.metadata.json".to_string())
        );
        assert_eq!(output_names("a.b.json").0, "a.txt");
        assert_eq!(output_names("noext").0, "noext.txt");
    }
}
