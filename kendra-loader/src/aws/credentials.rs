//! Credential and session provider: profile + region → signed-request context.
//!
//! Resolution order:
//! - an explicit profile is read from the shared credentials file
//!   (`AWS_SHARED_CREDENTIALS_FILE`, else `~/.aws/credentials`), then from
//!   the config file (`AWS_CONFIG_FILE`, else `~/.aws/config`);
//! - without a profile, `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` /
//!   `AWS_SESSION_TOKEN` are used, falling back to the `default` profile.
//!
//! `AWS_ENDPOINT_URL` replaces every service endpoint (LocalStack, MinIO).

use std::fmt;
use std::fs;
use std::path::PathBuf;

use kendra_loader_core::LoaderError;
use tracing::{debug, info};

#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AwsCredentials {
    pub fn from_env() -> Result<Self, LoaderError> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID").map_err(|_| {
            LoaderError::Credential("AWS_ACCESS_KEY_ID environment variable not set".into())
        })?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").map_err(|_| {
            LoaderError::Credential("AWS_SECRET_ACCESS_KEY environment variable not set".into())
        })?;
        let session_token = std::env::var("AWS_SESSION_TOKEN").ok();
        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token,
        })
    }

    /// Read `profile` from the shared credentials file, then from the config
    /// file for profiles that keep static keys there.
    pub fn from_profile(profile: &str) -> Result<Self, LoaderError> {
        let mut searched = Vec::new();
        for path in [shared_credentials_path()?, config_file_path()?] {
            debug!(path = %path.display(), profile, "Reading AWS profile file");
            let contents = match fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "AWS profile file not readable");
                    searched.push(path.display().to_string());
                    continue;
                }
            };
            if let Some(credentials) = parse_profile(&contents, profile) {
                return Ok(credentials);
            }
            searched.push(path.display().to_string());
        }
        Err(LoaderError::Credential(format!(
            "profile '{profile}' not found or incomplete in {}",
            searched.join(", ")
        )))
    }

    pub fn resolve(profile: Option<&str>) -> Result<Self, LoaderError> {
        match profile {
            Some(name) => Self::from_profile(name),
            None => Self::from_env().or_else(|env_err| {
                debug!(error = %env_err, "No credentials in environment, trying default profile");
                Self::from_profile("default")
            }),
        }
    }
}

pub fn shared_credentials_path() -> Result<PathBuf, LoaderError> {
    aws_file_path("AWS_SHARED_CREDENTIALS_FILE", "credentials")
}

pub fn config_file_path() -> Result<PathBuf, LoaderError> {
    aws_file_path("AWS_CONFIG_FILE", "config")
}

fn aws_file_path(override_var: &str, file_name: &str) -> Result<PathBuf, LoaderError> {
    if let Ok(path) = std::env::var(override_var) {
        return Ok(PathBuf::from(path));
    }
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(".aws").join(file_name))
        .map_err(|_| LoaderError::Credential("cannot locate home directory".into()))
}

/// Pull one profile out of an INI-style credentials file.
///
/// Both `[name]` and `[profile name]` headers are accepted. A profile
/// without an access key id and secret yields `None`.
pub fn parse_profile(contents: &str, profile: &str) -> Option<AwsCredentials> {
    let mut in_section = false;
    let mut access_key_id = None;
    let mut secret_access_key = None;
    let mut session_token = None;

    for raw_line in contents.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = header.trim();
            let name = name.strip_prefix("profile ").map(str::trim).unwrap_or(name);
            in_section = name == profile;
            continue;
        }
        if !in_section {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim().to_ascii_lowercase().as_str() {
            "aws_access_key_id" => access_key_id = Some(value),
            "aws_secret_access_key" => secret_access_key = Some(value),
            "aws_session_token" => session_token = Some(value),
            _ => {}
        }
    }

    Some(AwsCredentials {
        access_key_id: access_key_id?,
        secret_access_key: secret_access_key?,
        session_token,
    })
}

/// Authenticated context shared by the S3, Kendra and STS clients.
#[derive(Debug, Clone)]
pub struct AwsSession {
    pub credentials: AwsCredentials,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub http: reqwest::Client,
}

impl AwsSession {
    /// Resolve credentials for `profile` and bind them to `region`.
    pub fn new(profile: Option<&str>, region: &str) -> Result<Self, LoaderError> {
        let credentials = AwsCredentials::resolve(profile)?;
        let endpoint_url = std::env::var("AWS_ENDPOINT_URL").ok();
        info!(
            profile = profile.unwrap_or("<env>"),
            region,
            endpoint_override = endpoint_url.is_some(),
            "AWS session established"
        );
        Ok(Self::with_credentials(credentials, region).with_endpoint_url(endpoint_url))
    }

    pub fn with_credentials(credentials: AwsCredentials, region: &str) -> Self {
        Self {
            credentials,
            region: region.to_string(),
            endpoint_url: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_endpoint_url(mut self, endpoint_url: Option<String>) -> Self {
        self.endpoint_url = endpoint_url.map(|u| u.trim_end_matches('/').to_string());
        self
    }

    /// Base URL for a regional service endpoint, e.g. `https://kendra.us-east-1.amazonaws.com`.
    pub fn service_url(&self, service: &str) -> String {
        match &self.endpoint_url {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}.{}.amazonaws.com", service, self.region),
        }
    }
}
