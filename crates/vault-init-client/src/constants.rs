// Vault system API path constants

pub mod sys_api_path {
    pub const HEALTH: &str = "/v1/sys/health";
    pub const INIT: &str = "/v1/sys/init";
}

pub const DEFAULT_VAULT_ADDR: &str = "https://127.0.0.1:8200";
