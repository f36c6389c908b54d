// Error types for the secret store

use std::path::PathBuf;

use crate::constants::THROTTLING_ERRORS;

/// Errors that can occur while writing to the secret store
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("Invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error(
        "No AWS region configured: set AWS_REGION, add a region to the profile, or run where instance metadata is reachable"
    )]
    MissingRegion,

    #[error("{error_type} (status {status}): {message}")]
    Service {
        status: u16,
        error_type: String,
        message: String,
    },

    #[error("Credentials error: {0}")]
    Credentials(#[from] CredentialsError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SecretsError {
    /// Whether sending the same request again may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            SecretsError::Service {
                status, error_type, ..
            } => *status == 429 || *status >= 500 || THROTTLING_ERRORS.contains(&error_type.as_str()),
            SecretsError::Http(e) => !e.is_builder(),
            SecretsError::Credentials(e) => e.is_retryable(),
            SecretsError::InvalidEndpoint { .. }
            | SecretsError::MissingRegion
            | SecretsError::Serialization(_) => false,
        }
    }
}

/// Errors from a credentials provider
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    /// The provider has nothing to offer; a chain moves on to the next one
    #[error("credentials not loaded: {0}")]
    NotLoaded(String),

    #[error("invalid credentials configuration: {0}")]
    InvalidConfiguration(String),

    /// A configured source answered with an error
    #[error("credentials provider error: {0}")]
    Provider(String),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credentials request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode credentials response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl CredentialsError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, CredentialsError::Http(e) if !e.is_builder())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(status: u16, error_type: &str) -> SecretsError {
        SecretsError::Service {
            status,
            error_type: error_type.to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn test_error_display() {
        let err = SecretsError::Service {
            status: 400,
            error_type: "ResourceNotFoundException".to_string(),
            message: "Secrets Manager can't find the specified secret.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ResourceNotFoundException (status 400): Secrets Manager can't find the specified secret."
        );

        let err = SecretsError::InvalidEndpoint {
            endpoint: "::".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid endpoint ::: relative URL without a base"
        );
    }

    #[test]
    fn test_retryable_service_errors() {
        assert!(service(500, "InternalServiceError").is_retryable());
        assert!(service(503, "UnknownError").is_retryable());
        assert!(service(429, "").is_retryable());
        assert!(service(400, "ThrottlingException").is_retryable());
        assert!(service(400, "RequestTimeoutException").is_retryable());

        assert!(!service(400, "ResourceNotFoundException").is_retryable());
        assert!(!service(400, "AccessDeniedException").is_retryable());
        assert!(!service(403, "UnrecognizedClientException").is_retryable());
    }

    #[test]
    fn test_configuration_errors_are_not_retryable() {
        assert!(!SecretsError::MissingRegion.is_retryable());
        assert!(
            !SecretsError::Credentials(CredentialsError::NotLoaded("none".to_string()))
                .is_retryable()
        );
        let json_err = serde_json::from_str::<u32>("x").unwrap_err();
        assert!(!SecretsError::Serialization(json_err).is_retryable());
    }
}
