//! Error types for the sidecar

use vault_init_client::VaultError;
use vault_init_secrets::SecretsError;

/// Startup configuration errors. All of them stop the process before the
/// first health check.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set and not empty")]
    Missing(&'static str),

    #[error("failed to parse {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("configuration error: {0}")]
    Source(#[from] config::ConfigError),
}

/// Reasons an initialization attempt was abandoned.
///
/// None of these are fatal: the cluster still reports uninitialized and the
/// next poll starts over.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init request failed: {0}")]
    Request(#[source] VaultError),

    #[error("init: non 200 status code: {status}")]
    Rejected { status: u16, body: String },

    #[error("init response could not be decoded: {0}")]
    Decode(#[source] VaultError),
}

impl From<VaultError> for InitError {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::RequestFailed { status, body } => InitError::Rejected { status, body },
            VaultError::Http(e) if !e.is_decode() => InitError::Request(VaultError::Http(e)),
            other => InitError::Decode(other),
        }
    }
}

/// The cluster is initialized but its credentials were not recorded.
///
/// The cluster will not hand out the root token or the recovery keys again,
/// so this is fatal and needs an operator.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to encode secret for {secret_id}: {source}")]
    Encode {
        secret_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to store root token in {secret_id}: {source}")]
    RootToken {
        secret_id: String,
        #[source]
        source: SecretsError,
    },

    #[error("failed to store recovery keys in {secret_id} (root token was stored): {source}")]
    RecoveryKeys {
        secret_id: String,
        #[source]
        source: SecretsError,
    },
}

impl PersistError {
    /// Whether the root token reached the secret store before the failure
    pub fn root_token_stored(&self) -> bool {
        matches!(self, PersistError::RecoveryKeys { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Missing("ROOT_TOKEN_SECRET_ID");
        assert_eq!(
            err.to_string(),
            "ROOT_TOKEN_SECRET_ID must be set and not empty"
        );

        let err = ConfigError::Invalid {
            key: "VAULT_STORED_SHARES",
            value: "two".to_string(),
            reason: "invalid digit found in string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to parse VAULT_STORED_SHARES=\"two\": invalid digit found in string"
        );
    }

    #[test]
    fn test_init_error_from_vault_error() {
        let err: InitError = VaultError::RequestFailed {
            status: 503,
            body: String::new(),
        }
        .into();
        assert!(matches!(err, InitError::Rejected { status: 503, .. }));
        assert_eq!(err.to_string(), "init: non 200 status code: 503");

        let json_err = serde_json::from_str::<u32>("x").unwrap_err();
        let err: InitError = VaultError::Serialization(json_err).into();
        assert!(matches!(err, InitError::Decode(_)));
    }

    #[test]
    fn test_root_token_stored() {
        let service_error = || SecretsError::Service {
            status: 400,
            error_type: "AccessDeniedException".to_string(),
            message: "denied".to_string(),
        };

        let root = PersistError::RootToken {
            secret_id: "root".to_string(),
            source: service_error(),
        };
        assert!(!root.root_token_stored());

        let recovery = PersistError::RecoveryKeys {
            secret_id: "recovery".to_string(),
            source: service_error(),
        };
        assert!(recovery.root_token_stored());
    }
}
