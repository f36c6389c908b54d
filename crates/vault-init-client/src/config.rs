// Configuration for VaultClient

use std::time::Duration;

use crate::constants::DEFAULT_VAULT_ADDR;

/// Configuration for the Vault HTTP client
#[derive(Clone, Debug)]
pub struct VaultClientConfig {
    /// Cluster base address (e.g. "https://127.0.0.1:8200")
    pub addr: String,
    /// Accept any server certificate. The cluster usually serves a
    /// self-signed certificate on the internal network.
    pub insecure_skip_verify: bool,
    /// Per-request timeout; `None` leaves the transport default in place
    pub request_timeout: Option<Duration>,
}

impl Default for VaultClientConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_VAULT_ADDR.to_string(),
            insecure_skip_verify: true,
            request_timeout: None,
        }
    }
}

impl VaultClientConfig {
    /// Create a new config for a single cluster address
    pub fn new(addr: &str) -> Self {
        Self {
            addr: addr.to_string(),
            ..Default::default()
        }
    }

    /// Set whether certificate verification is skipped
    pub fn with_insecure_skip_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_verify = skip;
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = VaultClientConfig::default();
        assert_eq!(config.addr, "https://127.0.0.1:8200");
        assert!(config.insecure_skip_verify);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = VaultClientConfig::new("https://vault.internal:8200")
            .with_insecure_skip_verify(false)
            .with_request_timeout(Some(Duration::from_secs(5)));

        assert_eq!(config.addr, "https://vault.internal:8200");
        assert!(!config.insecure_skip_verify);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
    }
}
