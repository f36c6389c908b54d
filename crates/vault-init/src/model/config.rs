//! Configuration for the sidecar
//!
//! Everything comes from the process environment and is read once at startup.
//! The resulting [`Configuration`] is immutable and handed to each component.

use std::time::Duration;

use config::{Config, Environment};
use vault_init_client::{VaultClientConfig, constants::DEFAULT_VAULT_ADDR, model::InitRequest};
use vault_init_secrets::{AwsSettings, RetryConfig, SecretsError, SecretsManagerConfig};

use crate::error::ConfigError;

use super::constants::{
    CHECK_INTERVAL, DEFAULT_CHECK_INTERVAL, DEFAULT_SECRETS_MANAGER_MAX_ATTEMPTS, DEFAULT_SHARES,
    DEFAULT_SKIP_VERIFY, RECOVERY_KEYS_SECRET_ID, ROOT_TOKEN_SECRET_ID,
    SECRETS_MANAGER_MAX_ATTEMPTS, SECRETS_MANAGER_REQUEST_TIMEOUT, VAULT_ADDR,
    VAULT_INIT_REQUEST_TIMEOUT, VAULT_RECOVERY_SHARES, VAULT_RECOVERY_THRESHOLD,
    VAULT_SKIP_VERIFY, VAULT_STORED_SHARES,
};

/// Application configuration loaded from the environment
#[derive(Clone, Debug)]
pub struct Configuration {
    pub vault_addr: String,
    pub root_token_secret_id: String,
    pub recovery_keys_secret_id: String,
    pub stored_shares: u32,
    pub recovery_shares: u32,
    pub recovery_threshold: u32,
    pub check_interval: Duration,
    /// Trust boundary for the cluster endpoint: accept unverified certificates
    pub insecure_skip_verify: bool,
    pub request_timeout: Option<Duration>,
    /// Inputs to the AWS region and credential lookup
    pub aws: AwsSettings,
    pub secrets_manager_request_timeout: Option<Duration>,
    /// Attempts per secret write, including the first
    pub secrets_manager_max_attempts: u32,
}

impl Configuration {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(Environment::default())
    }

    /// Load from an explicit set of variables instead of the process environment
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_source(Environment::default().source(Some(vars)))
    }

    fn from_source(source: Environment) -> Result<Self, ConfigError> {
        let env = Env {
            config: Config::builder().add_source(source).build()?,
        };

        let root_token_secret_id = env.required(ROOT_TOKEN_SECRET_ID)?;
        let recovery_keys_secret_id = env.required(RECOVERY_KEYS_SECRET_ID)?;

        let check_interval = env.duration(CHECK_INTERVAL)?.unwrap_or(DEFAULT_CHECK_INTERVAL);
        if check_interval.is_zero() {
            return Err(ConfigError::Invalid {
                key: CHECK_INTERVAL,
                value: env.get(CHECK_INTERVAL).unwrap_or_default(),
                reason: "interval must be greater than zero".to_string(),
            });
        }

        let secrets_manager_max_attempts = env
            .count(SECRETS_MANAGER_MAX_ATTEMPTS)?
            .unwrap_or(DEFAULT_SECRETS_MANAGER_MAX_ATTEMPTS);
        if secrets_manager_max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: SECRETS_MANAGER_MAX_ATTEMPTS,
                value: "0".to_string(),
                reason: "at least one attempt is required".to_string(),
            });
        }

        Ok(Self {
            vault_addr: env
                .get(VAULT_ADDR)
                .unwrap_or_else(|| DEFAULT_VAULT_ADDR.to_string()),
            root_token_secret_id,
            recovery_keys_secret_id,
            stored_shares: env.count(VAULT_STORED_SHARES)?.unwrap_or(DEFAULT_SHARES),
            recovery_shares: env.count(VAULT_RECOVERY_SHARES)?.unwrap_or(DEFAULT_SHARES),
            recovery_threshold: env.count(VAULT_RECOVERY_THRESHOLD)?.unwrap_or(DEFAULT_SHARES),
            check_interval,
            insecure_skip_verify: env.flag(VAULT_SKIP_VERIFY)?.unwrap_or(DEFAULT_SKIP_VERIFY),
            request_timeout: env.duration(VAULT_INIT_REQUEST_TIMEOUT)?,
            aws: AwsSettings::from_lookup(|key| env.get(key)),
            secrets_manager_request_timeout: env.duration(SECRETS_MANAGER_REQUEST_TIMEOUT)?,
            secrets_manager_max_attempts,
        })
    }

    pub fn init_request(&self) -> InitRequest {
        InitRequest {
            stored_shares: self.stored_shares,
            recovery_shares: self.recovery_shares,
            recovery_threshold: self.recovery_threshold,
        }
    }

    pub fn vault_client_config(&self) -> VaultClientConfig {
        VaultClientConfig::new(&self.vault_addr)
            .with_insecure_skip_verify(self.insecure_skip_verify)
            .with_request_timeout(self.request_timeout)
    }

    /// Resolve the AWS region and credentials for the secret store.
    ///
    /// Fails when no region or no credentials can be found.
    pub async fn secrets_manager_config(&self) -> Result<SecretsManagerConfig, SecretsError> {
        Ok(SecretsManagerConfig::load(&self.aws)
            .await?
            .with_request_timeout(self.secrets_manager_request_timeout)
            .with_retry(RetryConfig::default().with_max_attempts(self.secrets_manager_max_attempts)))
    }
}

/// Typed lookups over the collected environment. Empty values count as unset.
struct Env {
    config: Config,
}

impl Env {
    fn get(&self, key: &str) -> Option<String> {
        self.config
            .get_string(&key.to_ascii_lowercase())
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn parsed<T>(
        &self,
        key: &'static str,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Result<Option<T>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => parse(&value)
                .map(Some)
                .map_err(|reason| ConfigError::Invalid { key, value, reason }),
        }
    }

    fn count(&self, key: &'static str) -> Result<Option<u32>, ConfigError> {
        self.parsed(key, |v| v.parse::<u32>().map_err(|e| e.to_string()))
    }

    fn flag(&self, key: &'static str) -> Result<Option<bool>, ConfigError> {
        self.parsed(key, parse_bool)
    }

    fn duration(&self, key: &'static str) -> Result<Option<Duration>, ConfigError> {
        self.parsed(key, parse_duration)
    }
}

/// Accepts the usual spellings: `1 t T TRUE true True` and `0 f F FALSE false False`
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid boolean {:?}", value)),
    }
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(1_000_000_000),
        "m" => Some(60 * 1_000_000_000),
        "h" => Some(3600 * 1_000_000_000),
        _ => None,
    }
}

/// Parse a duration such as `500ms`, `1m30s` or `1.5h`.
///
/// A value ending in a digit is taken as seconds: `30` is 30s and `1m30` is
/// 1m30s.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let mut text = value.trim().to_string();
    if text.is_empty() {
        return Err("empty duration".to_string());
    }
    if text.ends_with(|c: char| c.is_ascii_digit()) {
        text.push('s');
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let invalid = || format!("invalid duration {:?}", value);

    let mut rest = text.as_str();
    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_end = rest.find(|c: char| !is_number(c)).unwrap_or(rest.len());
        let number = &rest[..number_end];
        rest = &rest[number_end..];

        let unit_end = rest.find(is_number).unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        rest = &rest[unit_end..];

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
            return Err(invalid());
        }
        let per_unit = match unit {
            "" => return Err(format!("missing unit in duration {:?}", value)),
            unit => unit_nanos(unit).ok_or_else(|| format!("unknown unit {:?} in duration {:?}", unit, value))?,
        };

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut nanos = whole.checked_mul(per_unit).ok_or_else(invalid)?;

        // Digits past nanosecond precision do not matter
        let fraction = &fraction[..fraction.len().min(18)];
        if !fraction.is_empty() {
            let digits: u128 = fraction.parse().map_err(|_| invalid())?;
            nanos += digits * per_unit / 10u128.pow(fraction.len() as u32);
        }

        total = total.checked_add(nanos).ok_or_else(invalid)?;
    }

    u64::try_from(total)
        .map(Duration::from_nanos)
        .map_err(|_| format!("duration {:?} is out of range", value))
}
