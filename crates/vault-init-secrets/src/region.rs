// Region lookup: environment, then profile, then instance metadata

use tracing::debug;

use crate::{
    credentials::{ImdsClient, ProfileSet},
    error::SecretsError,
    settings::AwsSettings,
};

pub async fn resolve_region(settings: &AwsSettings) -> Result<String, SecretsError> {
    if let Some(region) = &settings.region {
        return Ok(region.clone());
    }

    let profile = ProfileSet::load(settings).await?;
    if let Some(region) = profile.region() {
        debug!(profile = profile.name(), %region, "Region from profile");
        return Ok(region);
    }

    if !settings.ec2_metadata_disabled {
        match ImdsClient::new(settings)?.region().await {
            Ok(region) if !region.trim().is_empty() => {
                debug!(region = region.trim(), "Region from instance metadata");
                return Ok(region.trim().to_string());
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "No region from instance metadata"),
        }
    }

    Err(SecretsError::MissingRegion)
}
