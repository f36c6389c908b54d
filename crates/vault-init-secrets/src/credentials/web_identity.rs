// Web identity federation (EKS IRSA): AssumeRoleWithWebIdentity against STS

use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, header::ACCEPT};
use serde::Deserialize;

use super::{ProvideCredentials, parse_rfc3339};
use crate::{config::Credentials, error::CredentialsError, settings::AwsSettings};

const STS_API_VERSION: &str = "2011-06-15";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleWithWebIdentityEnvelope {
    assume_role_with_web_identity_response: AssumeRoleWithWebIdentityResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleWithWebIdentityResponse {
    assume_role_with_web_identity_result: AssumeRoleWithWebIdentityResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleWithWebIdentityResult {
    credentials: StsCredentials,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StsCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
    /// Epoch seconds in JSON responses, RFC 3339 in some proxies
    expiration: serde_json::Value,
}

fn parse_expiration(value: &serde_json::Value) -> Result<DateTime<Utc>, CredentialsError> {
    match value {
        serde_json::Value::Number(n) => n
            .as_f64()
            .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
            .ok_or_else(|| {
                CredentialsError::Provider(format!("STS returned expiration {}", n))
            }),
        serde_json::Value::String(s) => parse_rfc3339(s, "STS"),
        other => Err(CredentialsError::Provider(format!(
            "STS returned expiration {}",
            other
        ))),
    }
}

#[derive(Debug)]
pub struct WebIdentityProvider {
    client: Client,
    token_file: Option<PathBuf>,
    role_arn: Option<String>,
    session_name: String,
    endpoint: String,
}

impl WebIdentityProvider {
    pub fn new(settings: &AwsSettings, region: &str) -> Result<Self, CredentialsError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            token_file: settings.web_identity_token_file.clone(),
            role_arn: settings.role_arn.clone(),
            session_name: settings
                .role_session_name
                .clone()
                .unwrap_or_else(|| format!("vault-init-{}", Utc::now().timestamp_millis())),
            endpoint: settings
                .sts_endpoint
                .clone()
                .unwrap_or_else(|| format!("https://sts.{}.amazonaws.com", region)),
        })
    }
}

#[async_trait]
impl ProvideCredentials for WebIdentityProvider {
    async fn provide_credentials(&self) -> Result<Credentials, CredentialsError> {
        let (token_file, role_arn) = match (&self.token_file, &self.role_arn) {
            (Some(token_file), Some(role_arn)) => (token_file, role_arn),
            (None, None) => {
                return Err(CredentialsError::NotLoaded(
                    "AWS_WEB_IDENTITY_TOKEN_FILE is not set".to_string(),
                ));
            }
            _ => {
                return Err(CredentialsError::InvalidConfiguration(
                    "AWS_WEB_IDENTITY_TOKEN_FILE and AWS_ROLE_ARN must be set together".to_string(),
                ));
            }
        };

        // Rotated by the kubelet; read it on every call
        let token = tokio::fs::read_to_string(token_file)
            .await
            .map_err(|source| CredentialsError::Io {
                path: token_file.clone(),
                source,
            })?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .form(&[
                ("Action", "AssumeRoleWithWebIdentity"),
                ("Version", STS_API_VERSION),
                ("RoleArn", role_arn.as_str()),
                ("RoleSessionName", self.session_name.as_str()),
                ("WebIdentityToken", token.trim()),
            ])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CredentialsError::Provider(format!(
                "AssumeRoleWithWebIdentity failed with status {}: {}",
                status, body
            )));
        }

        let envelope: AssumeRoleWithWebIdentityEnvelope = serde_json::from_str(&body)?;
        let sts = envelope
            .assume_role_with_web_identity_response
            .assume_role_with_web_identity_result
            .credentials;
        let expiry = parse_expiration(&sts.expiration)?;

        Ok(Credentials::new(&sts.access_key_id, &sts.secret_access_key)
            .with_session_token(Some(sts.session_token))
            .with_expiry(Some(expiry)))
    }
}
