// vault-init-secrets: secret store adapter backed by AWS Secrets Manager

pub mod client;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod model;
pub mod region;
pub mod retry;
pub mod settings;
pub mod signing;
pub mod store;

pub use client::SecretsManagerClient;
pub use config::{Credentials, SecretsManagerConfig};
pub use credentials::{CredentialsChain, ProvideCredentials, SharedCredentialsProvider};
pub use error::{CredentialsError, SecretsError};
pub use retry::RetryConfig;
pub use settings::AwsSettings;
pub use store::SecretStore;
