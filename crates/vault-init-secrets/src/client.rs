// SecretsManagerClient - PutSecretValue over the JSON protocol

use chrono::Utc;
use reqwest::{Client, header::AUTHORIZATION};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::{
    config::SecretsManagerConfig,
    constants::{
        CONTENT_TYPE, HEADER_AMZ_DATE, HEADER_AMZ_SECURITY_TOKEN, HEADER_AMZ_TARGET,
        SERVICE_NAME, TARGET_PUT_SECRET_VALUE,
    },
    error::SecretsError,
    model::{ErrorResponse, PutSecretValueInput, PutSecretValueOutput},
    signing::{SignableRequest, SigningParams, authorization},
};

/// Minimal AWS Secrets Manager client
pub struct SecretsManagerClient {
    client: Client,
    config: SecretsManagerConfig,
    endpoint: Url,
}

impl SecretsManagerClient {
    pub fn new(config: SecretsManagerConfig) -> Result<Self, SecretsError> {
        let raw = config.resolved_endpoint();
        let endpoint = Url::parse(&raw).map_err(|e| SecretsError::InvalidEndpoint {
            endpoint: raw.clone(),
            reason: e.to_string(),
        })?;
        if endpoint.host_str().is_none() {
            return Err(SecretsError::InvalidEndpoint {
                endpoint: raw,
                reason: "endpoint has no host".to_string(),
            });
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config,
            endpoint,
        })
    }

    pub fn config(&self) -> &SecretsManagerConfig {
        &self.config
    }

    /// `Host` header value as reqwest will send it
    fn host_header(&self) -> String {
        let host = self.endpoint.host_str().unwrap_or_default();
        match self.endpoint.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Store `secret_string` as the new current version of `secret_id`.
    ///
    /// Throttling, server errors and transport failures are retried with
    /// backoff. Every attempt carries the same `ClientRequestToken`, so an
    /// attempt that reached the service before failing is not applied twice.
    pub async fn put_secret_value(
        &self,
        secret_id: &str,
        secret_string: &str,
    ) -> Result<PutSecretValueOutput, SecretsError> {
        let client_request_token = Uuid::new_v4().to_string();
        let body = serde_json::to_vec(&PutSecretValueInput {
            client_request_token: Some(&client_request_token),
            secret_id,
            secret_string,
        })?;

        let retry = &self.config.retry;
        let max_attempts = retry.attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.send_put_secret_value(&body).await {
                Ok(output) => {
                    debug!(
                        secret_id,
                        version_id = %output.version_id,
                        attempt,
                        "PutSecretValue succeeded"
                    );
                    return Ok(output);
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = retry.calculate_delay(attempt);
                    warn!(
                        secret_id,
                        attempt,
                        max_attempts,
                        error = %e,
                        "PutSecretValue failed, retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One signed attempt
    async fn send_put_secret_value(
        &self,
        body: &[u8],
    ) -> Result<PutSecretValueOutput, SecretsError> {
        let credentials = self.config.credentials.provide_credentials().await?;
        let params = SigningParams {
            credentials: &credentials,
            region: &self.config.region,
            service: SERVICE_NAME,
            time: Utc::now(),
        };
        let amz_date = params.amz_date();
        let host = self.host_header();

        let mut headers: Vec<(&str, &str)> = vec![
            ("content-type", CONTENT_TYPE),
            ("host", host.as_str()),
            (HEADER_AMZ_DATE, amz_date.as_str()),
            (HEADER_AMZ_TARGET, TARGET_PUT_SECRET_VALUE),
        ];
        if let Some(token) = &credentials.session_token {
            headers.push((HEADER_AMZ_SECURITY_TOKEN, token.as_str()));
        }

        let auth = authorization(
            &params,
            &SignableRequest {
                method: "POST",
                path: self.endpoint.path(),
                query: "",
                headers: &headers,
                payload: body,
            },
        );

        // reqwest derives Host from the URL
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, auth);
        for (name, value) in headers.iter().filter(|(name, _)| *name != "host") {
            request = request.header(*name, *value);
        }

        let response = request.body(body.to_vec()).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let parsed: ErrorResponse = serde_json::from_str(&text).unwrap_or_default();
            let error_type = match parsed.short_type() {
                "" => "UnknownError".to_string(),
                name => name.to_string(),
            };
            let message = if parsed.message.is_empty() {
                text
            } else {
                parsed.message
            };
            return Err(SecretsError::Service {
                status: status.as_u16(),
                error_type,
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(PutSecretValueOutput::default());
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;

    fn config(endpoint: Option<&str>) -> SecretsManagerConfig {
        SecretsManagerConfig::new("us-east-1", Credentials::new("AKID", "secret"))
            .with_endpoint(endpoint.map(str::to_string))
    }

    #[test]
    fn test_host_header_default_endpoint() {
        let client = SecretsManagerClient::new(config(None)).unwrap();
        assert_eq!(client.host_header(), "secretsmanager.us-east-1.amazonaws.com");
    }

    #[test]
    fn test_host_header_keeps_explicit_port() {
        let client = SecretsManagerClient::new(config(Some("http://localhost:4566"))).unwrap();
        assert_eq!(client.host_header(), "localhost:4566");
    }

    #[test]
    fn test_invalid_endpoint() {
        let result = SecretsManagerClient::new(config(Some("not a url")));
        assert!(matches!(result, Err(SecretsError::InvalidEndpoint { .. })));
    }
}
