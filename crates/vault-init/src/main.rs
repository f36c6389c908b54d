//! Entry point for the vault-init sidecar.

use tracing::{error, info};
use vault_init::{
    Bootstrapper, Configuration,
    startup::{self, LoggingConfig},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _logging_guard = startup::init_logging(&LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    info!("Starting the vault-init service...");

    let configuration = Configuration::from_env().inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;
    info!(
        vault_addr = %configuration.vault_addr,
        root_token_secret_id = %configuration.root_token_secret_id,
        recovery_keys_secret_id = %configuration.recovery_keys_secret_id,
        stored_shares = configuration.stored_shares,
        recovery_shares = configuration.recovery_shares,
        recovery_threshold = configuration.recovery_threshold,
        check_interval = ?configuration.check_interval,
        insecure_skip_verify = configuration.insecure_skip_verify,
        secrets_manager_max_attempts = configuration.secrets_manager_max_attempts,
        "Configuration loaded"
    );
    if configuration.insecure_skip_verify {
        info!("TLS certificate verification is disabled for {}", configuration.vault_addr);
    }

    let bootstrapper = Bootstrapper::from_configuration(&configuration)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to set up the secret store"))?;
    let shutdown = startup::listen_for_shutdown_signal()?;

    bootstrapper.run(&shutdown).await?;

    info!("Shutdown complete");
    Ok(())
}
