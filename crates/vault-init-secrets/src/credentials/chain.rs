// Tries providers in order until one has credentials

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{
    ContainerProvider, EnvironmentProvider, ImdsProvider, ProfileProvider, ProvideCredentials,
    SharedCredentialsProvider, WebIdentityProvider,
};
use crate::{config::Credentials, error::CredentialsError, settings::AwsSettings};

/// Providers consulted in order. A provider answering
/// [`CredentialsError::NotLoaded`] is skipped; any other error ends the search.
#[derive(Debug, Default)]
pub struct CredentialsChain {
    providers: Vec<(&'static str, SharedCredentialsProvider)>,
}

impl CredentialsChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(
        mut self,
        name: &'static str,
        provider: impl ProvideCredentials + 'static,
    ) -> Self {
        self.providers.push((name, Arc::new(provider)));
        self
    }

    /// Environment, profile, web identity, container, instance metadata
    pub fn default_chain(settings: &AwsSettings, region: &str) -> Result<Self, CredentialsError> {
        Ok(Self::new()
            .with_provider("environment", EnvironmentProvider::new(settings))
            .with_provider("profile", ProfileProvider::new(settings))
            .with_provider("web_identity", WebIdentityProvider::new(settings, region)?)
            .with_provider("container", ContainerProvider::new(settings)?)
            .with_provider("instance_metadata", ImdsProvider::new(settings)?))
    }
}

#[async_trait]
impl ProvideCredentials for CredentialsChain {
    async fn provide_credentials(&self) -> Result<Credentials, CredentialsError> {
        let mut skipped = Vec::new();

        for (name, provider) in &self.providers {
            match provider.provide_credentials().await {
                Ok(credentials) => {
                    info!(provider = name, "Loaded AWS credentials");
                    return Ok(credentials);
                }
                Err(CredentialsError::NotLoaded(reason)) => {
                    debug!(provider = name, %reason, "No credentials from provider");
                    skipped.push(format!("{}: {}", name, reason));
                }
                Err(e) => return Err(e),
            }
        }

        Err(CredentialsError::NotLoaded(format!(
            "no provider had credentials ({})",
            skipped.join("; ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum Fixed {
        Loaded(&'static str),
        NotLoaded,
        Broken,
    }

    #[async_trait]
    impl ProvideCredentials for Fixed {
        async fn provide_credentials(&self) -> Result<Credentials, CredentialsError> {
            match self {
                Fixed::Loaded(id) => Ok(Credentials::new(id, "secret")),
                Fixed::NotLoaded => Err(CredentialsError::NotLoaded("nothing".to_string())),
                Fixed::Broken => Err(CredentialsError::Provider("broken".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_first_loaded_provider_wins() {
        let chain = CredentialsChain::new()
            .with_provider("a", Fixed::NotLoaded)
            .with_provider("b", Fixed::Loaded("B"))
            .with_provider("c", Fixed::Loaded("C"));
        assert_eq!(chain.provide_credentials().await.unwrap().access_key_id, "B");
    }

    #[tokio::test]
    async fn test_error_stops_the_chain() {
        let chain = CredentialsChain::new()
            .with_provider("a", Fixed::Broken)
            .with_provider("b", Fixed::Loaded("B"));
        assert!(matches!(
            chain.provide_credentials().await,
            Err(CredentialsError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn test_nothing_loaded_lists_every_provider() {
        let chain = CredentialsChain::new()
            .with_provider("a", Fixed::NotLoaded)
            .with_provider("b", Fixed::NotLoaded);
        let err = chain.provide_credentials().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "credentials not loaded: no provider had credentials (a: nothing; b: nothing)"
        );
    }
}
