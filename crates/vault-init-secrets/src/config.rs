// Configuration for SecretsManagerClient

use std::{fmt, sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::info;

use crate::{
    credentials::{
        CredentialsCache, CredentialsChain, ProvideCredentials, SharedCredentialsProvider,
    },
    error::SecretsError,
    region::resolve_region,
    retry::RetryConfig,
    settings::AwsSettings,
};

/// Temporary credentials are replaced this long before they expire
const REFRESH_BUFFER_MINUTES: i64 = 5;

/// AWS credentials used to sign requests
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Present for temporary (STS) credentials
    pub session_token: Option<String>,
    /// `None` for long-lived keys
    pub expiry: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn new(access_key_id: &str, secret_access_key: &str) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
            session_token: None,
            expiry: None,
        }
    }

    pub fn with_session_token(mut self, token: Option<String>) -> Self {
        self.session_token = token;
        self
    }

    pub fn with_expiry(mut self, expiry: Option<DateTime<Utc>>) -> Self {
        self.expiry = expiry;
        self
    }

    /// Whether these can still be used at `now` without refreshing first
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .is_none_or(|expiry| expiry - TimeDelta::minutes(REFRESH_BUFFER_MINUTES) > now)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Configuration for the Secrets Manager client
#[derive(Clone, Debug)]
pub struct SecretsManagerConfig {
    /// AWS region (e.g. "us-east-1")
    pub region: String,
    /// Endpoint override; defaults to the regional public endpoint
    pub endpoint: Option<String>,
    pub credentials: SharedCredentialsProvider,
    /// Per-request timeout; `None` leaves the transport default in place
    pub request_timeout: Option<Duration>,
    pub retry: RetryConfig,
}

impl SecretsManagerConfig {
    pub fn new(region: &str, credentials: impl ProvideCredentials + 'static) -> Self {
        Self {
            region: region.to_string(),
            endpoint: None,
            credentials: Arc::new(credentials),
            request_timeout: None,
            retry: RetryConfig::default(),
        }
    }

    /// Resolve the region and credentials the way the AWS SDKs do.
    ///
    /// Credentials are fetched once here, so a process that cannot sign
    /// requests fails before it does anything else.
    pub async fn load(settings: &AwsSettings) -> Result<Self, SecretsError> {
        let region = resolve_region(settings).await?;
        let credentials = CredentialsCache::new(CredentialsChain::default_chain(settings, &region)?);
        let resolved = credentials.provide_credentials().await?;
        info!(
            region = %region,
            access_key_id = %resolved.access_key_id,
            expiry = ?resolved.expiry,
            "AWS credentials loaded"
        );

        Ok(Self::new(&region, credentials).with_endpoint(settings.secrets_manager_endpoint.clone()))
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// The endpoint requests are sent to
    pub fn resolved_endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://secretsmanager.{}.amazonaws.com", self.region),
        }
    }
}
