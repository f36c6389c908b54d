//! Health Monitor: classifies the cluster from its `sys/health` status code

use std::sync::Arc;

use tracing::{info, warn};
use vault_init_client::{VaultClient, VaultError, model::ClusterState};

pub struct HealthMonitor {
    client: Arc<VaultClient>,
}

impl HealthMonitor {
    pub fn new(client: Arc<VaultClient>) -> Self {
        Self { client }
    }

    /// Check the cluster health once.
    ///
    /// A transport failure is not a state; the caller logs it and waits for the
    /// next interval.
    pub async fn poll(&self) -> Result<ClusterState, VaultError> {
        let state = self.client.health().await?;
        match state {
            ClusterState::Initialized => info!("Vault is initialized and unsealed."),
            ClusterState::Standby => info!("Vault is unsealed and in standby mode."),
            ClusterState::Uninitialized => info!("Vault is not initialized."),
            ClusterState::Unknown(status) => {
                warn!(status, "Vault is in an unknown state. Status code: {}", status)
            }
        }
        Ok(state)
    }
}
