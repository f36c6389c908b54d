//! The poll loop: check health, maybe initialize, sleep, until shutdown.

use std::{sync::Arc, time::Duration};

use tracing::{error, info};
use vault_init_client::VaultClient;
use vault_init_secrets::{SecretStore, SecretsManagerClient};

use crate::{
    error::PersistError, health::HealthMonitor, initializer::Initializer,
    model::config::Configuration, startup::ShutdownSignal,
};

pub struct Bootstrapper {
    monitor: HealthMonitor,
    initializer: Initializer,
    check_interval: Duration,
}

impl Bootstrapper {
    pub fn new(
        configuration: &Configuration,
        client: Arc<VaultClient>,
        store: Arc<dyn SecretStore>,
    ) -> Self {
        Self {
            monitor: HealthMonitor::new(client.clone()),
            initializer: Initializer::new(configuration, client, store),
            check_interval: configuration.check_interval,
        }
    }

    /// Build the cluster and secret-store clients described by `configuration`.
    ///
    /// AWS credentials are resolved here, so a sidecar that could never store
    /// what it initializes fails before it touches the cluster.
    pub async fn from_configuration(configuration: &Configuration) -> anyhow::Result<Self> {
        let client = Arc::new(VaultClient::new(configuration.vault_client_config())?);
        let secrets_manager = configuration.secrets_manager_config().await?;
        let store: Arc<dyn SecretStore> = Arc::new(SecretsManagerClient::new(secrets_manager)?);
        Ok(Self::new(configuration, client, store))
    }

    /// Run until `shutdown` fires.
    ///
    /// Returns an error only when the cluster was initialized but its
    /// credentials could not be stored. Every other failure is logged and
    /// retried on the next interval.
    pub async fn run(&self, shutdown: &ShutdownSignal) -> Result<(), PersistError> {
        let mut shutdown_rx = shutdown.subscribe();

        loop {
            if shutdown.is_shutdown() {
                info!("Shutting down");
                return Ok(());
            }

            match self.monitor.poll().await {
                Ok(state) => {
                    if state.needs_init()
                        && let Err(e) = self.initializer.run().await
                    {
                        error!(
                            error = %e,
                            root_token_stored = e.root_token_stored(),
                            "Vault was initialized but its credentials were not stored. \
                             The root token and recovery keys cannot be retrieved again; \
                             manual intervention is required."
                        );
                        return Err(e);
                    }
                    info!("Next check in {:?}", self.check_interval);
                }
                Err(e) => error!(error = %e, "Health check failed"),
            }

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutting down");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.check_interval) => {}
            }
        }
    }
}
