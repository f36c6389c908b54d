// SecretStore - the write-only view of a secret store

use async_trait::async_trait;

use crate::{client::SecretsManagerClient, error::SecretsError};

/// A key-value credential store that secrets are written into
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Write `secret_string` as the current value of `secret_id`
    async fn put_secret_string(&self, secret_id: &str, secret_string: &str)
    -> Result<(), SecretsError>;
}

#[async_trait]
impl SecretStore for SecretsManagerClient {
    async fn put_secret_string(
        &self,
        secret_id: &str,
        secret_string: &str,
    ) -> Result<(), SecretsError> {
        self.put_secret_value(secret_id, secret_string)
            .await
            .map(|_| ())
    }
}
