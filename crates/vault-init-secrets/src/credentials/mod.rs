//! AWS credential providers
//!
//! [`CredentialsChain::default_chain`] looks where the AWS SDKs look, in order:
//! environment variables, the shared profile files, a web identity token, the
//! ECS container endpoint, and the EC2 instance metadata service.

mod cache;
mod chain;
mod container;
mod environment;
mod imds;
mod profile;
mod web_identity;

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{config::Credentials, error::CredentialsError};

pub use cache::CredentialsCache;
pub use chain::CredentialsChain;
pub use container::ContainerProvider;
pub use environment::EnvironmentProvider;
pub use imds::{ImdsClient, ImdsProvider};
pub use profile::{ProfileProvider, ProfileSet};
pub use web_identity::WebIdentityProvider;

/// A source of AWS credentials
#[async_trait]
pub trait ProvideCredentials: fmt::Debug + Send + Sync {
    async fn provide_credentials(&self) -> Result<Credentials, CredentialsError>;
}

pub type SharedCredentialsProvider = Arc<dyn ProvideCredentials>;

#[async_trait]
impl ProvideCredentials for Credentials {
    async fn provide_credentials(&self) -> Result<Credentials, CredentialsError> {
        Ok(self.clone())
    }
}

/// Body served by the ECS container endpoint and by instance metadata
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CredentialsDocument {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    expiration: Option<String>,
}

impl CredentialsDocument {
    fn into_credentials(self, source: &str) -> Result<Credentials, CredentialsError> {
        if let Some(code) = &self.code
            && code != "Success"
        {
            return Err(CredentialsError::Provider(format!(
                "{} returned {}: {}",
                source,
                code,
                self.message.unwrap_or_default()
            )));
        }

        let (Some(access_key_id), Some(secret_access_key)) =
            (self.access_key_id, self.secret_access_key)
        else {
            return Err(CredentialsError::Provider(format!(
                "{} response is missing AccessKeyId or SecretAccessKey",
                source
            )));
        };

        let expiry = self
            .expiration
            .as_deref()
            .map(|raw| parse_rfc3339(raw, source))
            .transpose()?;

        Ok(Credentials::new(&access_key_id, &secret_access_key)
            .with_session_token(self.token)
            .with_expiry(expiry))
    }
}

fn parse_rfc3339(raw: &str, source: &str) -> Result<DateTime<Utc>, CredentialsError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            CredentialsError::Provider(format!("{} returned expiration {:?}: {}", source, raw, e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_with_expiry() {
        let doc: CredentialsDocument = serde_json::from_str(
            r#"{
                "Code": "Success",
                "LastUpdated": "2024-05-01T10:00:00Z",
                "Type": "AWS-HMAC",
                "AccessKeyId": "ASIAEXAMPLE",
                "SecretAccessKey": "secret",
                "Token": "session",
                "Expiration": "2024-05-01T16:00:00Z"
            }"#,
        )
        .unwrap();
        let creds = doc.into_credentials("test").unwrap();
        assert_eq!(creds.access_key_id, "ASIAEXAMPLE");
        assert_eq!(creds.session_token.as_deref(), Some("session"));
        assert_eq!(
            creds.expiry.unwrap().to_rfc3339(),
            "2024-05-01T16:00:00+00:00"
        );
    }

    #[test]
    fn test_document_failure_code() {
        let doc: CredentialsDocument =
            serde_json::from_str(r#"{"Code":"AssumeRoleUnauthorizedAccess","Message":"denied"}"#)
                .unwrap();
        let err = doc.into_credentials("instance metadata").unwrap_err();
        assert_eq!(
            err.to_string(),
            "credentials provider error: instance metadata returned AssumeRoleUnauthorizedAccess: denied"
        );
    }

    #[test]
    fn test_document_without_keys() {
        let doc: CredentialsDocument = serde_json::from_str(r#"{"Token":"t"}"#).unwrap();
        assert!(matches!(
            doc.into_credentials("container"),
            Err(CredentialsError::Provider(_))
        ));
    }
}
