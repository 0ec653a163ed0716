//! Minimal AWS clients over `reqwest`, signed with SigV4.
//!
//! Only the three calls the tools make are covered: S3 `PutObject`, Kendra
//! `Query` and STS `GetCallerIdentity`. Setting `AWS_ENDPOINT_URL` points all
//! of them at a local emulator instead of the regional endpoints.

pub mod credentials;
pub mod kendra;
pub mod s3;
pub mod sigv4;
pub mod sts;

pub use credentials::{AwsCredentials, AwsSession};
pub use kendra::KendraClient;
pub use s3::S3Client;
pub use sts::{CallerIdentity, StsClient};

/// Extract the text of the first `<tag>` element in an XML document.
pub(crate) fn extract_xml_value(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = xml.find(&open)? + open.len();
    let end = xml[start..].find(&close)?;
    Some(xml[start..start + end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_matching_element() {
        let xml = "<Error><Code>AccessDenied</Code><Message>no</Message></Error>";
        assert_eq!(extract_xml_value(xml, "Code").as_deref(), Some("AccessDenied"));
        assert_eq!(extract_xml_value(xml, "Message").as_deref(), Some("no"));
        assert!(extract_xml_value(xml, "RequestId").is_none());
    }
}
