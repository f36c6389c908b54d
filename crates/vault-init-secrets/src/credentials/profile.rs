//! Shared profile files: `~/.aws/credentials` and `~/.aws/config`
//!
//! Only static keys are read from a profile. A profile that relies on
//! `role_arn`, `credential_process` or SSO yields nothing and the chain moves
//! on.

use std::{collections::HashMap, io, path::Path};

use async_trait::async_trait;
use config::{Config, File, FileFormat};

use super::ProvideCredentials;
use crate::{
    config::Credentials,
    constants::{DEFAULT_PROFILE, profile_keys},
    error::CredentialsError,
    settings::AwsSettings,
};

type Section = HashMap<String, String>;
type ProfileFile = HashMap<String, Section>;

/// The selected profile, merged from both files
#[derive(Debug, Default)]
pub struct ProfileSet {
    name: String,
    /// From `~/.aws/credentials`, section `[name]`
    credentials: Option<Section>,
    /// From `~/.aws/config`, section `[profile name]` (or `[default]`)
    config: Option<Section>,
}

impl ProfileSet {
    pub async fn load(settings: &AwsSettings) -> Result<Self, CredentialsError> {
        let name = settings
            .profile
            .clone()
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        let credentials_file = match &settings.shared_credentials_file {
            Some(path) => read_profile_file(path).await?,
            None => None,
        };
        let config_file = match &settings.config_file {
            Some(path) => read_profile_file(path).await?,
            None => None,
        };

        let config_sections = if name == DEFAULT_PROFILE {
            vec![DEFAULT_PROFILE.to_string(), format!("profile {}", DEFAULT_PROFILE)]
        } else {
            vec![format!("profile {}", name)]
        };

        Ok(Self {
            credentials: credentials_file.and_then(|file| find_section(file, &[name.clone()])),
            config: config_file.and_then(|file| find_section(file, &config_sections)),
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exists(&self) -> bool {
        self.credentials.is_some() || self.config.is_some()
    }

    /// Look up `key`; the credentials file wins over the config file
    pub fn get(&self, key: &str) -> Option<String> {
        [&self.credentials, &self.config]
            .into_iter()
            .flatten()
            .find_map(|section| section.get(key))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn region(&self) -> Option<String> {
        self.get(profile_keys::REGION)
    }
}

fn find_section(mut file: ProfileFile, names: &[String]) -> Option<Section> {
    names.iter().find_map(|name| {
        let key = file
            .keys()
            .find(|k| k.trim().eq_ignore_ascii_case(name))
            .cloned()?;
        file.remove(&key)
    })
}

async fn read_profile_file(path: &Path) -> Result<Option<ProfileFile>, CredentialsError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => parse_profile_file(&text)
            .map(Some)
            .map_err(|reason| {
                CredentialsError::InvalidConfiguration(format!(
                    "malformed profile file {}: {}",
                    path.display(),
                    reason
                ))
            }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(CredentialsError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_profile_file(text: &str) -> Result<ProfileFile, config::ConfigError> {
    Config::builder()
        .add_source(File::from_str(text, FileFormat::Ini))
        .build()?
        .try_deserialize()
}

#[derive(Debug)]
pub struct ProfileProvider {
    settings: AwsSettings,
}

impl ProfileProvider {
    pub fn new(settings: &AwsSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }
}

#[async_trait]
impl ProvideCredentials for ProfileProvider {
    async fn provide_credentials(&self) -> Result<Credentials, CredentialsError> {
        let profile = ProfileSet::load(&self.settings).await?;

        if !profile.exists() {
            return Err(match &self.settings.profile {
                Some(name) => CredentialsError::InvalidConfiguration(format!(
                    "profile {:?} is not defined in the shared credentials or config file",
                    name
                )),
                None => CredentialsError::NotLoaded("no default profile".to_string()),
            });
        }

        match (
            profile.get(profile_keys::ACCESS_KEY_ID),
            profile.get(profile_keys::SECRET_ACCESS_KEY),
        ) {
            (Some(id), Some(secret)) => Ok(Credentials::new(&id, &secret)
                .with_session_token(profile.get(profile_keys::SESSION_TOKEN))),
            _ => Err(CredentialsError::NotLoaded(format!(
                "profile {:?} has no static credentials",
                profile.name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile_file() {
        let file = parse_profile_file(
            "[default]\n\
             aws_access_key_id = AKIDDEFAULT\n\
             aws_secret_access_key = default-secret\n\
             \n\
             # comment\n\
             [profile vault]\n\
             region = eu-central-1\n",
        )
        .unwrap();

        let default = find_section(file.clone(), &["default".to_string()]).unwrap();
        assert_eq!(default["aws_access_key_id"], "AKIDDEFAULT");

        let vault = find_section(file, &["profile vault".to_string()]).unwrap();
        assert_eq!(vault["region"], "eu-central-1");
    }

    #[test]
    fn test_missing_section() {
        let file = parse_profile_file("[default]\nregion = us-east-1\n").unwrap();
        assert!(find_section(file, &["profile other".to_string()]).is_none());
    }

    #[tokio::test]
    async fn test_missing_files_are_empty() {
        let settings = AwsSettings {
            shared_credentials_file: Some("/nonexistent/credentials".into()),
            config_file: Some("/nonexistent/config".into()),
            ..Default::default()
        };
        let profile = ProfileSet::load(&settings).await.unwrap();
        assert!(!profile.exists());
        assert!(profile.region().is_none());
    }
}
