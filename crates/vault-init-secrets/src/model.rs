// Secrets Manager request and response bodies

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutSecretValueInput<'a> {
    /// Idempotency token; repeating a request with the same token and value
    /// creates no second version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_request_token: Option<&'a str>,
    pub secret_id: &'a str,
    pub secret_string: &'a str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutSecretValueOutput {
    #[serde(rename = "ARN", default)]
    pub arn: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version_id: String,
    #[serde(default)]
    pub version_stages: Vec<String>,
}

/// Error body of a failed call. Services disagree on the casing of `message`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(rename = "__type", default)]
    pub error_type: String,
    #[serde(alias = "Message", default)]
    pub message: String,
}

impl ErrorResponse {
    /// `__type` may carry a namespace prefix, e.g. `com.amazonaws...#Name`
    pub fn short_type(&self) -> &str {
        self.error_type
            .rsplit_once('#')
            .map(|(_, name)| name)
            .unwrap_or(&self.error_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_serialization() {
        let input = PutSecretValueInput {
            client_request_token: Some("7b9e1c52-3f0e-4f43-9a0e-2d8b2b7f4d11"),
            secret_id: "vault-root-token",
            secret_string: r#"{"root-token":"s.abc"}"#,
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["ClientRequestToken"], "7b9e1c52-3f0e-4f43-9a0e-2d8b2b7f4d11");
        assert_eq!(json["SecretId"], "vault-root-token");
        assert_eq!(json["SecretString"], r#"{"root-token":"s.abc"}"#);

        let input = PutSecretValueInput {
            client_request_token: None,
            secret_id: "id",
            secret_string: "value",
        };
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("ClientRequestToken").is_none());
    }

    #[test]
    fn test_output_deserialization() {
        let json = r#"{
            "ARN": "arn:aws:secretsmanager:us-east-1:123456789012:secret:vault-root-token-a1b2c3",
            "Name": "vault-root-token",
            "VersionId": "EXAMPLE1-90ab-cdef-fedc-ba987EXAMPLE",
            "VersionStages": ["AWSCURRENT"]
        }"#;
        let output: PutSecretValueOutput = serde_json::from_str(json).unwrap();
        assert_eq!(output.name, "vault-root-token");
        assert_eq!(output.version_stages, vec!["AWSCURRENT"]);
        assert!(output.arn.ends_with("a1b2c3"));
    }

    #[test]
    fn test_error_response_casing() {
        let lower: ErrorResponse =
            serde_json::from_str(r#"{"__type":"ResourceNotFoundException","message":"gone"}"#)
                .unwrap();
        assert_eq!(lower.message, "gone");

        let upper: ErrorResponse = serde_json::from_str(
            r#"{"__type":"com.amazonaws.secretsmanager#AccessDeniedException","Message":"no"}"#,
        )
        .unwrap();
        assert_eq!(upper.message, "no");
        assert_eq!(upper.short_type(), "AccessDeniedException");
    }
}
