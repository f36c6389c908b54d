//! Initializer: the one-shot `sys/init` call and the two secret-store writes
//! that must follow it.

use std::sync::Arc;

use serde::{Serialize, Serializer, ser::SerializeMap};
use tracing::{error, info};
use vault_init_client::{
    VaultClient,
    model::{InitRequest, InitResponse},
};
use vault_init_secrets::SecretStore;

use crate::{
    error::{InitError, PersistError},
    model::{
        config::Configuration,
        constants::{RECOVERY_KEY_PREFIX, ROOT_TOKEN_KEY},
    },
};

/// How an initialization attempt ended, short of a fatal error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitAttempt {
    /// Cluster initialized and both secrets stored
    Completed,
    /// The init call failed; nothing was written and a later poll retries
    Abandoned,
}

/// `{"root-token": ..}`
struct RootTokenSecret<'a>(&'a str);

impl Serialize for RootTokenSecret<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(ROOT_TOKEN_KEY, self.0)?;
        map.end()
    }
}

/// `{"recovery-key-1": .., "recovery-key-2": ..}` in encounter order
struct RecoveryKeysSecret<'a>(&'a InitResponse);

impl Serialize for RecoveryKeysSecret<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.keys.len()))?;
        for (index, recovery_key) in self.0.recovery_keys().enumerate() {
            map.serialize_entry(&recovery_key_label(index), recovery_key)?;
        }
        map.end()
    }
}

fn recovery_key_label(index: usize) -> String {
    format!("{}{}", RECOVERY_KEY_PREFIX, index + 1)
}

pub struct Initializer {
    client: Arc<VaultClient>,
    store: Arc<dyn SecretStore>,
    request: InitRequest,
    root_token_secret_id: String,
    recovery_keys_secret_id: String,
}

impl Initializer {
    pub fn new(
        configuration: &Configuration,
        client: Arc<VaultClient>,
        store: Arc<dyn SecretStore>,
    ) -> Self {
        Self {
            client,
            store,
            request: configuration.init_request(),
            root_token_secret_id: configuration.root_token_secret_id.clone(),
            recovery_keys_secret_id: configuration.recovery_keys_secret_id.clone(),
        }
    }

    /// Send the init request. After a successful return the cluster is
    /// initialized and the returned credentials exist nowhere else.
    pub async fn initialize(&self) -> Result<InitResponse, InitError> {
        Ok(self.client.init(&self.request).await?)
    }

    /// Write the root token, then the recovery keys. Stops at the first
    /// failure; there is no rollback of a write that already happened.
    pub async fn persist(&self, result: InitResponse) -> Result<(), PersistError> {
        let root_token = serde_json::to_string(&RootTokenSecret(&result.root_token)).map_err(
            |source| PersistError::Encode {
                secret_id: self.root_token_secret_id.clone(),
                source,
            },
        )?;
        let recovery_keys = serde_json::to_string(&RecoveryKeysSecret(&result)).map_err(
            |source| PersistError::Encode {
                secret_id: self.recovery_keys_secret_id.clone(),
                source,
            },
        )?;

        info!("Storing root token and recovery keys in Secrets Manager...");

        self.store
            .put_secret_string(&self.root_token_secret_id, &root_token)
            .await
            .map_err(|source| PersistError::RootToken {
                secret_id: self.root_token_secret_id.clone(),
                source,
            })?;
        info!(secret_id = %self.root_token_secret_id, "Root token stored");

        self.store
            .put_secret_string(&self.recovery_keys_secret_id, &recovery_keys)
            .await
            .map_err(|source| PersistError::RecoveryKeys {
                secret_id: self.recovery_keys_secret_id.clone(),
                source,
            })?;
        info!(
            secret_id = %self.recovery_keys_secret_id,
            keys = result.keys.len(),
            "Recovery keys stored"
        );

        Ok(())
    }

    /// One full attempt: initialize, then persist.
    ///
    /// Init failures are logged and reported as [`InitAttempt::Abandoned`].
    /// Only a persistence failure is returned as an error.
    pub async fn run(&self) -> Result<InitAttempt, PersistError> {
        info!("Initializing...");

        let result = match self.initialize().await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Initialization attempt failed, retrying on a later check");
                return Ok(InitAttempt::Abandoned);
            }
        };

        self.persist(result).await?;

        info!("Initialization complete.");
        Ok(InitAttempt::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(n: usize) -> InitResponse {
        InitResponse {
            keys: (1..=n).map(|i| format!("key-{}", i)).collect(),
            keys_base64: Vec::new(),
            root_token: "s.abc".to_string(),
        }
    }

    #[test]
    fn test_root_token_payload() {
        let json = serde_json::to_string(&RootTokenSecret("s.abc")).unwrap();
        assert_eq!(json, r#"{"root-token":"s.abc"}"#);
    }

    #[test]
    fn test_recovery_keys_payload_is_one_indexed() {
        let response = response(3);
        let json = serde_json::to_string(&RecoveryKeysSecret(&response)).unwrap();
        assert_eq!(
            json,
            r#"{"recovery-key-1":"key-1","recovery-key-2":"key-2","recovery-key-3":"key-3"}"#
        );
    }

    #[test]
    fn test_recovery_keys_payload_keeps_encounter_order() {
        let response = response(11);
        let json = serde_json::to_string(&RecoveryKeysSecret(&response)).unwrap();

        let pos_9 = json.find("\"recovery-key-9\"").unwrap();
        let pos_10 = json.find("\"recovery-key-10\"").unwrap();
        let pos_11 = json.find("\"recovery-key-11\"").unwrap();
        assert!(pos_9 < pos_10 && pos_10 < pos_11);

        let parsed: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 11);
        assert_eq!(parsed["recovery-key-10"], "key-10");
    }

    #[test]
    fn test_no_recovery_keys() {
        let response = response(0);
        let json = serde_json::to_string(&RecoveryKeysSecret(&response)).unwrap();
        assert_eq!(json, "{}");
    }
}
