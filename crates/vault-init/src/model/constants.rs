//! Environment variable names and defaults

use std::time::Duration;

pub const VAULT_ADDR: &str = "VAULT_ADDR";
pub const VAULT_SKIP_VERIFY: &str = "VAULT_SKIP_VERIFY";
pub const VAULT_INIT_REQUEST_TIMEOUT: &str = "VAULT_INIT_REQUEST_TIMEOUT";

pub const ROOT_TOKEN_SECRET_ID: &str = "ROOT_TOKEN_SECRET_ID";
pub const RECOVERY_KEYS_SECRET_ID: &str = "RECOVERY_KEYS_SECRET_ID";

pub const VAULT_STORED_SHARES: &str = "VAULT_STORED_SHARES";
pub const VAULT_RECOVERY_SHARES: &str = "VAULT_RECOVERY_SHARES";
pub const VAULT_RECOVERY_THRESHOLD: &str = "VAULT_RECOVERY_THRESHOLD";

pub const CHECK_INTERVAL: &str = "CHECK_INTERVAL";

pub const SECRETS_MANAGER_REQUEST_TIMEOUT: &str = "SECRETS_MANAGER_REQUEST_TIMEOUT";
pub const SECRETS_MANAGER_MAX_ATTEMPTS: &str = "SECRETS_MANAGER_MAX_ATTEMPTS";

pub const DEFAULT_SHARES: u32 = 1;
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_SKIP_VERIFY: bool = true;
pub const DEFAULT_SECRETS_MANAGER_MAX_ATTEMPTS: u32 = 5;

/// Secret key the root token is stored under
pub const ROOT_TOKEN_KEY: &str = "root-token";
/// Recovery keys are stored as `recovery-key-1`, `recovery-key-2`, ...
pub const RECOVERY_KEY_PREFIX: &str = "recovery-key-";
