//! STS `GetCallerIdentity`, logged at startup so a run shows which account it
//! talks to.

use chrono::Utc;
use reqwest::Url;
use tracing::debug;

use super::credentials::AwsSession;
use super::extract_xml_value;
use super::sigv4::{self, SigningParams};
use kendra_loader_core::contract::RemoteError;

const FORM_BODY: &str = "Action=GetCallerIdentity&Version=2011-06-15";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
    pub user_id: String,
}

#[derive(Debug, Clone)]
pub struct StsClient {
    session: AwsSession,
}

impl StsClient {
    pub fn new(session: AwsSession) -> Self {
        Self { session }
    }

    pub async fn get_caller_identity(&self) -> Result<CallerIdentity, RemoteError> {
        let url = Url::parse(&format!("{}/", self.session.service_url("sts")))?;
        let headers = sigv4::sign(&SigningParams {
            credentials: &self.session.credentials,
            region: &self.session.region,
            service: "sts",
            method: "POST",
            url: &url,
            headers: &[(
                "content-type",
                "application/x-www-form-urlencoded; charset=utf-8",
            )],
            payload: FORM_BODY.as_bytes(),
            now: Utc::now(),
        });

        debug!("POST GetCallerIdentity");
        let mut builder = self.session.http.post(url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let response = builder.body(FORM_BODY).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let code = extract_xml_value(&text, "Code").unwrap_or_else(|| status.to_string());
            return Err(format!("STS GetCallerIdentity failed ({status}): {code}").into());
        }

        let field = |tag: &str| {
            extract_xml_value(&text, tag)
                .ok_or_else(|| format!("GetCallerIdentity response has no <{tag}>"))
        };
        Ok(CallerIdentity {
            account: field("Account")?,
            arn: field("Arn")?,
            user_id: field("UserId")?,
        })
    }
}
