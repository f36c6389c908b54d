//! AWS settings taken from the environment
//!
//! A snapshot of every variable the region and credential lookups consult.
//! Building it from a lookup function keeps the process environment out of
//! tests.

use std::{fmt, path::PathBuf};

use crate::constants::env_vars::*;

/// Everything the region and credential providers read from the environment
#[derive(Clone, Default)]
pub struct AwsSettings {
    /// `AWS_REGION`, falling back to `AWS_DEFAULT_REGION`
    pub region: Option<String>,

    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,

    /// `AWS_PROFILE`, falling back to `AWS_DEFAULT_PROFILE`
    pub profile: Option<String>,
    pub shared_credentials_file: Option<PathBuf>,
    pub config_file: Option<PathBuf>,

    pub web_identity_token_file: Option<PathBuf>,
    pub role_arn: Option<String>,
    pub role_session_name: Option<String>,
    pub sts_endpoint: Option<String>,

    pub container_credentials_relative_uri: Option<String>,
    pub container_credentials_full_uri: Option<String>,
    pub container_authorization_token: Option<String>,
    pub container_authorization_token_file: Option<PathBuf>,

    pub ec2_metadata_disabled: bool,
    pub ec2_metadata_endpoint: Option<String>,

    pub secrets_manager_endpoint: Option<String>,
}

impl AwsSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let home = get(HOME).or_else(|| get(USERPROFILE)).map(PathBuf::from);
        let path = |key: &str, default: &str| {
            get(key)
                .map(|p| expand_home(&p, home.as_ref()))
                .or_else(|| home.as_ref().map(|h| h.join(default)))
        };

        Self {
            region: get(AWS_REGION).or_else(|| get(AWS_DEFAULT_REGION)),
            access_key_id: get(AWS_ACCESS_KEY_ID),
            secret_access_key: get(AWS_SECRET_ACCESS_KEY),
            session_token: get(AWS_SESSION_TOKEN),
            profile: get(AWS_PROFILE).or_else(|| get(AWS_DEFAULT_PROFILE)),
            shared_credentials_file: path(AWS_SHARED_CREDENTIALS_FILE, ".aws/credentials"),
            config_file: path(AWS_CONFIG_FILE, ".aws/config"),
            web_identity_token_file: get(AWS_WEB_IDENTITY_TOKEN_FILE).map(PathBuf::from),
            role_arn: get(AWS_ROLE_ARN),
            role_session_name: get(AWS_ROLE_SESSION_NAME),
            sts_endpoint: get(AWS_ENDPOINT_URL_STS),
            container_credentials_relative_uri: get(AWS_CONTAINER_CREDENTIALS_RELATIVE_URI),
            container_credentials_full_uri: get(AWS_CONTAINER_CREDENTIALS_FULL_URI),
            container_authorization_token: get(AWS_CONTAINER_AUTHORIZATION_TOKEN),
            container_authorization_token_file: get(AWS_CONTAINER_AUTHORIZATION_TOKEN_FILE)
                .map(PathBuf::from),
            ec2_metadata_disabled: get(AWS_EC2_METADATA_DISABLED)
                .is_some_and(|v| v.eq_ignore_ascii_case("true")),
            ec2_metadata_endpoint: get(AWS_EC2_METADATA_SERVICE_ENDPOINT),
            secrets_manager_endpoint: get(AWS_ENDPOINT_URL_SECRETS_MANAGER),
        }
    }
}

fn expand_home(path: &str, home: Option<&PathBuf>) -> PathBuf {
    match (path.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

impl fmt::Debug for AwsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("AwsSettings")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &redacted(&self.secret_access_key))
            .field("session_token", &redacted(&self.session_token))
            .field("profile", &self.profile)
            .field("shared_credentials_file", &self.shared_credentials_file)
            .field("config_file", &self.config_file)
            .field("web_identity_token_file", &self.web_identity_token_file)
            .field("role_arn", &self.role_arn)
            .field("role_session_name", &self.role_session_name)
            .field("sts_endpoint", &self.sts_endpoint)
            .field(
                "container_credentials_relative_uri",
                &self.container_credentials_relative_uri,
            )
            .field(
                "container_credentials_full_uri",
                &self.container_credentials_full_uri,
            )
            .field(
                "container_authorization_token",
                &redacted(&self.container_authorization_token),
            )
            .field(
                "container_authorization_token_file",
                &self.container_authorization_token_file,
            )
            .field("ec2_metadata_disabled", &self.ec2_metadata_disabled)
            .field("ec2_metadata_endpoint", &self.ec2_metadata_endpoint)
            .field("secrets_manager_endpoint", &self.secrets_manager_endpoint)
            .finish()
    }
}
