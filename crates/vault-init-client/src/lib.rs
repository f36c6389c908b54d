// vault-init-client: HTTP client for the Vault sys/health and sys/init endpoints

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod model;

pub use client::VaultClient;
pub use config::VaultClientConfig;
pub use error::VaultError;
