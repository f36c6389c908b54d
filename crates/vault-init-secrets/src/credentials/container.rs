// ECS task role and EKS Pod Identity credentials

use std::{
    net::{Ipv4Addr, Ipv6Addr},
    path::PathBuf,
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{Client, header::AUTHORIZATION};
use url::{Host, Url};

use super::{CredentialsDocument, ProvideCredentials};
use crate::{config::Credentials, error::CredentialsError, settings::AwsSettings};

const ECS_ENDPOINT: &str = "http://169.254.170.2";
const ECS_HOST: Ipv4Addr = Ipv4Addr::new(169, 254, 170, 2);
const EKS_HOST_V4: Ipv4Addr = Ipv4Addr::new(169, 254, 170, 23);
const EKS_HOST_V6: Ipv6Addr = Ipv6Addr::new(0xfd00, 0x0ec2, 0, 0, 0, 0, 0, 0x23);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct ContainerProvider {
    client: Client,
    uri: Option<String>,
    token: Option<String>,
    token_file: Option<PathBuf>,
}

impl ContainerProvider {
    pub fn new(settings: &AwsSettings) -> Result<Self, CredentialsError> {
        let uri = match (
            &settings.container_credentials_relative_uri,
            &settings.container_credentials_full_uri,
        ) {
            (Some(relative), _) => Some(format!("{}{}", ECS_ENDPOINT, relative)),
            (None, Some(full)) => Some(full.clone()),
            (None, None) => None,
        };

        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            uri,
            token: settings.container_authorization_token.clone(),
            token_file: settings.container_authorization_token_file.clone(),
        })
    }

    /// The token file is re-read on every call; it is rotated in place
    async fn authorization(&self) -> Result<Option<String>, CredentialsError> {
        match &self.token_file {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .map(|token| Some(token.trim().to_string()))
                .map_err(|source| CredentialsError::Io {
                    path: path.clone(),
                    source,
                }),
            None => Ok(self.token.clone()),
        }
    }
}

/// Plain HTTP is only trusted for loopback and the ECS/EKS link-local agents
fn validate_uri(uri: &str) -> Result<Url, CredentialsError> {
    let url = Url::parse(uri).map_err(|e| {
        CredentialsError::InvalidConfiguration(format!(
            "invalid container credentials URI {:?}: {}",
            uri, e
        ))
    })?;

    let allowed = match (url.scheme(), url.host()) {
        ("https", Some(_)) => true,
        ("http", Some(Host::Ipv4(ip))) => ip.is_loopback() || ip == ECS_HOST || ip == EKS_HOST_V4,
        ("http", Some(Host::Ipv6(ip))) => ip.is_loopback() || ip == EKS_HOST_V6,
        ("http", Some(Host::Domain(domain))) => domain.eq_ignore_ascii_case("localhost"),
        _ => false,
    };
    if !allowed {
        return Err(CredentialsError::InvalidConfiguration(format!(
            "container credentials URI {:?} must use https or a loopback or ECS/EKS agent address",
            uri
        )));
    }
    Ok(url)
}

#[async_trait]
impl ProvideCredentials for ContainerProvider {
    async fn provide_credentials(&self) -> Result<Credentials, CredentialsError> {
        let Some(uri) = &self.uri else {
            return Err(CredentialsError::NotLoaded(
                "no container credentials URI set".to_string(),
            ));
        };
        let url = validate_uri(uri)?;

        let mut request = self.client.get(url);
        if let Some(token) = self.authorization().await? {
            request = request.header(AUTHORIZATION, token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CredentialsError::Provider(format!(
                "container credentials endpoint returned status {}: {}",
                status, body
            )));
        }

        serde_json::from_str::<CredentialsDocument>(&body)?.into_credentials("container endpoint")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_uri_targets_ecs_agent() {
        let settings = AwsSettings {
            container_credentials_relative_uri: Some("/v2/credentials/abc".to_string()),
            container_credentials_full_uri: Some("http://127.0.0.1/ignored".to_string()),
            ..Default::default()
        };
        let provider = ContainerProvider::new(&settings).unwrap();
        assert_eq!(
            provider.uri.as_deref(),
            Some("http://169.254.170.2/v2/credentials/abc")
        );
    }

    #[test]
    fn test_allowed_uris() {
        for uri in [
            "http://169.254.170.2/v2/credentials",
            "http://169.254.170.23/v1/credentials",
            "http://[fd00:ec2::23]/v1/credentials",
            "http://127.0.0.1:8080/creds",
            "http://localhost/creds",
            "http://[::1]/creds",
            "https://credentials.example.com/creds",
        ] {
            assert!(validate_uri(uri).is_ok(), "{}", uri);
        }
    }

    #[test]
    fn test_rejected_uris() {
        for uri in [
            "http://10.0.0.5/creds",
            "http://credentials.example.com/creds",
            "ftp://127.0.0.1/creds",
            "not a uri",
        ] {
            assert!(
                matches!(validate_uri(uri), Err(CredentialsError::InvalidConfiguration(_))),
                "{}",
                uri
            );
        }
    }
}
