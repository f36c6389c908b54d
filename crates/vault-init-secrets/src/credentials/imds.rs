//! EC2 instance metadata (IMDSv2)
//!
//! Every read first obtains a session token with a `PUT`, then sends it with
//! the `GET`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::{CredentialsDocument, ProvideCredentials};
use crate::{config::Credentials, error::CredentialsError, settings::AwsSettings};

const DEFAULT_ENDPOINT: &str = "http://169.254.169.254";
const TOKEN_PATH: &str = "/latest/api/token";
const CREDENTIALS_PATH: &str = "/latest/meta-data/iam/security-credentials/";
const REGION_PATH: &str = "/latest/meta-data/placement/region";

const TOKEN_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";
const TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
const TOKEN_TTL_SECONDS: &str = "21600";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone, Debug)]
pub struct ImdsClient {
    client: Client,
    endpoint: String,
}

impl ImdsClient {
    pub fn new(settings: &AwsSettings) -> Result<Self, CredentialsError> {
        let endpoint = settings
            .ec2_metadata_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT)
            .trim_end_matches('/')
            .to_string();
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, endpoint })
    }

    async fn token(&self) -> Result<String, CredentialsError> {
        let response = self
            .client
            .put(format!("{}{}", self.endpoint, TOKEN_PATH))
            .header(TOKEN_TTL_HEADER, TOKEN_TTL_SECONDS)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CredentialsError::Provider(format!(
                "instance metadata token request failed with status {}",
                status
            )));
        }
        Ok(response.text().await?)
    }

    /// Read a metadata path
    pub async fn get(&self, path: &str) -> Result<String, CredentialsError> {
        let token = self.token().await?;
        let response = self
            .client
            .get(format!("{}{}", self.endpoint, path))
            .header(TOKEN_HEADER, token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.text().await?),
            StatusCode::NOT_FOUND => Err(CredentialsError::NotLoaded(format!(
                "{} not found in instance metadata",
                path
            ))),
            status => Err(CredentialsError::Provider(format!(
                "instance metadata request for {} failed with status {}",
                path, status
            ))),
        }
    }

    /// Region the instance runs in
    pub async fn region(&self) -> Result<String, CredentialsError> {
        self.get(REGION_PATH).await
    }
}

/// Credentials of the instance profile role
#[derive(Debug)]
pub struct ImdsProvider {
    client: Option<ImdsClient>,
}

impl ImdsProvider {
    pub fn new(settings: &AwsSettings) -> Result<Self, CredentialsError> {
        let client = if settings.ec2_metadata_disabled {
            None
        } else {
            Some(ImdsClient::new(settings)?)
        };
        Ok(Self { client })
    }

    async fn fetch(&self, client: &ImdsClient) -> Result<Credentials, CredentialsError> {
        let roles = client.get(CREDENTIALS_PATH).await?;
        let Some(role) = roles.lines().map(str::trim).find(|l| !l.is_empty()) else {
            return Err(CredentialsError::NotLoaded(
                "no instance profile attached".to_string(),
            ));
        };

        let body = client.get(&format!("{}{}", CREDENTIALS_PATH, role)).await?;
        serde_json::from_str::<CredentialsDocument>(&body)?.into_credentials("instance metadata")
    }
}

#[async_trait]
impl ProvideCredentials for ImdsProvider {
    async fn provide_credentials(&self) -> Result<Credentials, CredentialsError> {
        let Some(client) = &self.client else {
            return Err(CredentialsError::NotLoaded(
                "instance metadata is disabled".to_string(),
            ));
        };

        self.fetch(client).await.map_err(|e| match e {
            CredentialsError::Http(e) if e.is_connect() || e.is_timeout() => {
                CredentialsError::NotLoaded(format!("instance metadata unreachable: {}", e))
            }
            other => other,
        })
    }
}
