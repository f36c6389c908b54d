// Error types for VaultClient

/// Errors that can occur while talking to the Vault cluster
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VaultError::RequestFailed {
            status: 400,
            body: "Vault is already initialized".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Request failed with status 400: Vault is already initialized"
        );
    }

    #[test]
    fn test_serialization_error_from_json() {
        let err: VaultError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, VaultError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error: "));
    }
}
