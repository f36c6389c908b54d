// Credentials from AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY

use async_trait::async_trait;

use super::ProvideCredentials;
use crate::{config::Credentials, error::CredentialsError, settings::AwsSettings};

#[derive(Debug)]
pub struct EnvironmentProvider {
    credentials: Option<Credentials>,
    partial: bool,
}

impl EnvironmentProvider {
    pub fn new(settings: &AwsSettings) -> Self {
        match (&settings.access_key_id, &settings.secret_access_key) {
            (Some(id), Some(secret)) => Self {
                credentials: Some(
                    Credentials::new(id, secret).with_session_token(settings.session_token.clone()),
                ),
                partial: false,
            },
            (None, None) => Self {
                credentials: None,
                partial: false,
            },
            _ => Self {
                credentials: None,
                partial: true,
            },
        }
    }
}

#[async_trait]
impl ProvideCredentials for EnvironmentProvider {
    async fn provide_credentials(&self) -> Result<Credentials, CredentialsError> {
        match &self.credentials {
            Some(credentials) => Ok(credentials.clone()),
            None if self.partial => Err(CredentialsError::InvalidConfiguration(
                "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together".to_string(),
            )),
            None => Err(CredentialsError::NotLoaded(
                "AWS_ACCESS_KEY_ID is not set".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(id: Option<&str>, secret: Option<&str>) -> AwsSettings {
        AwsSettings {
            access_key_id: id.map(str::to_string),
            secret_access_key: secret.map(str::to_string),
            session_token: Some("token".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_both_keys() {
        let creds = EnvironmentProvider::new(&settings(Some("AKID"), Some("secret")))
            .provide_credentials()
            .await
            .unwrap();
        assert_eq!(creds.access_key_id, "AKID");
        assert_eq!(creds.session_token.as_deref(), Some("token"));
        assert!(creds.expiry.is_none());
    }

    #[tokio::test]
    async fn test_no_keys_is_not_loaded() {
        let result = EnvironmentProvider::new(&settings(None, None))
            .provide_credentials()
            .await;
        assert!(matches!(result, Err(CredentialsError::NotLoaded(_))));
    }

    #[tokio::test]
    async fn test_half_configured_is_an_error() {
        let result = EnvironmentProvider::new(&settings(Some("AKID"), None))
            .provide_credentials()
            .await;
        assert!(matches!(
            result,
            Err(CredentialsError::InvalidConfiguration(_))
        ));
    }
}
