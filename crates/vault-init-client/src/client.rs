// VaultClient - the sys/health check and the sys/init call

use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::{
    config::VaultClientConfig,
    constants::sys_api_path,
    error::VaultError,
    model::{ClusterState, InitRequest, InitResponse},
};

/// HTTP client for the Vault system API
pub struct VaultClient {
    client: Client,
    config: VaultClientConfig,
}

impl VaultClient {
    /// Create a new VaultClient with the given configuration
    pub fn new(config: VaultClientConfig) -> Result<Self, VaultError> {
        let mut builder =
            Client::builder().danger_accept_invalid_certs(config.insecure_skip_verify);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &VaultClientConfig {
        &self.config
    }

    /// Build full URL from the cluster base address
    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.config.addr.trim_end_matches('/'), path)
    }

    /// Issue `HEAD /v1/sys/health` and return the raw status code.
    ///
    /// Only transport failures are errors; every status code is a valid answer.
    pub async fn health_status(&self) -> Result<u16, VaultError> {
        let url = self.build_url(sys_api_path::HEALTH);
        let response = self.client.head(&url).send().await?;
        let status = response.status().as_u16();
        debug!(url = %url, status, "Health check answered");
        Ok(status)
    }

    /// Check the cluster health and classify the answer
    pub async fn health(&self) -> Result<ClusterState, VaultError> {
        self.health_status().await.map(ClusterState::from_status)
    }

    /// Issue `PUT /v1/sys/init`.
    ///
    /// Anything other than a 200 with a decodable body is an error.
    pub async fn init(&self, request: &InitRequest) -> Result<InitResponse, VaultError> {
        let url = self.build_url(sys_api_path::INIT);
        let response = self.client.put(&url).json(request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(VaultError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_trims_trailing_slash() {
        let client = VaultClient::new(VaultClientConfig::new("http://127.0.0.1:8200/")).unwrap();
        assert_eq!(
            client.build_url(sys_api_path::HEALTH),
            "http://127.0.0.1:8200/v1/sys/health"
        );
    }

    #[test]
    fn test_client_keeps_config() {
        let client = VaultClient::new(
            VaultClientConfig::new("https://vault:8200").with_insecure_skip_verify(false),
        )
        .unwrap();
        assert_eq!(client.config().addr, "https://vault:8200");
        assert!(!client.config().insecure_skip_verify);
    }
}
