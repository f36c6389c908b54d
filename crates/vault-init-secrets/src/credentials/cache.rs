// Caches credentials until they are close to expiring

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;

use super::{ProvideCredentials, SharedCredentialsProvider};
use crate::{config::Credentials, error::CredentialsError};

/// Wraps a provider and only asks it again once the cached credentials are
/// about to expire
#[derive(Debug)]
pub struct CredentialsCache {
    provider: SharedCredentialsProvider,
    cached: Mutex<Option<Credentials>>,
}

impl CredentialsCache {
    pub fn new(provider: impl ProvideCredentials + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
            cached: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ProvideCredentials for CredentialsCache {
    async fn provide_credentials(&self) -> Result<Credentials, CredentialsError> {
        let cached = self.cached.lock().clone();
        if let Some(credentials) = cached
            && credentials.is_fresh(Utc::now())
        {
            return Ok(credentials);
        }

        debug!("Refreshing AWS credentials");
        let fresh = self.provider.provide_credentials().await?;
        *self.cached.lock() = Some(fresh.clone());
        Ok(fresh)
    }
}
