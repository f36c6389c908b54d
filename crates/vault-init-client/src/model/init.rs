// Initialization model types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Body of a `PUT /v1/sys/init` request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitRequest {
    pub stored_shares: u32,
    pub recovery_shares: u32,
    pub recovery_threshold: u32,
}

/// Successful `sys/init` response.
///
/// Holds the only copy of the root token and the recovery shares, so the
/// `Debug` output redacts them.
#[derive(Clone, Serialize, Deserialize)]
pub struct InitResponse {
    #[serde(rename = "recovery_keys", default)]
    pub keys: Vec<String>,
    #[serde(rename = "recovery_keys_base64", default)]
    pub keys_base64: Vec<String>,
    pub root_token: String,
}

impl InitResponse {
    /// Recovery shares in the order the cluster returned them
    pub fn recovery_keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

impl fmt::Debug for InitResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitResponse")
            .field("keys", &format_args!("[{} redacted]", self.keys.len()))
            .field(
                "keys_base64",
                &format_args!("[{} redacted]", self.keys_base64.len()),
            )
            .field("root_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_request_serialization() {
        let req = InitRequest {
            stored_shares: 1,
            recovery_shares: 5,
            recovery_threshold: 3,
        };
        let json = serde_json::to_value(req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "stored_shares": 1,
                "recovery_shares": 5,
                "recovery_threshold": 3
            })
        );
    }

    #[test]
    fn test_init_response_deserialization() {
        let json = r#"{
            "keys": [],
            "keys_base64": [],
            "recovery_keys": ["aa", "bb"],
            "recovery_keys_base64": ["qg==", "uw=="],
            "root_token": "s.root"
        }"#;
        let resp: InitResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.keys, vec!["aa", "bb"]);
        assert_eq!(resp.root_token, "s.root");

        assert_eq!(resp.keys_base64, vec!["qg==", "uw=="]);
        assert_eq!(resp.recovery_keys().collect::<Vec<_>>(), vec!["aa", "bb"]);
    }

    #[test]
    fn test_missing_recovery_keys_default_to_empty() {
        let resp: InitResponse = serde_json::from_str(r#"{"root_token":"s.root"}"#).unwrap();
        assert!(resp.keys.is_empty());
        assert_eq!(resp.recovery_keys().count(), 0);
    }

    #[test]
    fn test_missing_root_token_is_an_error() {
        let result = serde_json::from_str::<InitResponse>(r#"{"recovery_keys":["aa"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let resp = InitResponse {
            keys: vec!["secret-share".to_string()],
            keys_base64: vec!["c2VjcmV0".to_string()],
            root_token: "s.very-secret".to_string(),
        };
        let debug = format!("{:?}", resp);
        assert!(!debug.contains("s.very-secret"));
        assert!(!debug.contains("secret-share"));
        assert!(debug.contains("[1 redacted]"));
    }
}
