//! HTTP transport and the login flow

use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_LOCATION, CONTENT_RANGE};
use serde_json::json;
use tracing::{debug, info, warn};

use pgrest_common::config::ClientConfig;

use crate::error::{ClientError, Result};
use crate::method::RequestMethod;
use crate::request::{prepare, RequestSpec};
use crate::response::ResponseEnvelope;

/// Protocol client
pub struct PostgrestClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl PostgrestClient {
    /// Build a client with the configured transport timeout
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Request spec against the configured base URL and schema
    pub fn request(&self, resource: impl Into<String>) -> RequestSpec {
        RequestSpec::from_config(&self.config, resource)
    }

    /// Issue one request and decode its response.
    ///
    /// Transport failures do not surface as errors: they yield the synthetic
    /// 500 envelope. Errors are reserved for malformed requests and responses.
    pub async fn send(&self, spec: &RequestSpec) -> Result<ResponseEnvelope> {
        let prepared = prepare(spec)?;
        info!("{} {}", prepared.method, prepared.url);
        debug!("Request headers: {:?}", prepared.headers);

        let mut builder = self
            .http
            .request(prepared.method.into(), prepared.url)
            .headers(prepared.headers);
        if let Some(body) = prepared.body {
            builder = builder.body(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request failed: {}", e);
                return Ok(ResponseEnvelope::internal_error());
            }
        };

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read response body: {}", e);
                return Ok(ResponseEnvelope::internal_error());
            }
        };

        let envelope = ResponseEnvelope::from_parts(
            spec.method,
            status,
            header_str(&headers, CONTENT_RANGE.as_str()),
            header_str(&headers, CONTENT_LOCATION.as_str()),
            &body,
        )?;

        info!(
            "API response: {}",
            serde_json::to_string(&envelope).unwrap_or_default()
        );
        Ok(envelope)
    }

    /// Exchange credentials for a bearer token via `rpc/<function>`.
    ///
    /// `function` may be given with or without its `rpc/` prefix.
    ///
    /// A rejected login (400 or 401) is reported after the configured failure
    /// delay. Any status other than 200, 400 or 401 is an error.
    pub async fn authenticate_user(
        &self,
        base_url: &str,
        function: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthOutcome> {
        let function = function.trim_matches('/');
        let resource = if function.starts_with("rpc/") {
            function.to_string()
        } else {
            format!("rpc/{function}")
        };

        let spec = RequestSpec::new(base_url, resource)
            .schema(self.config.schema.clone())
            .method(RequestMethod::Post)
            .body(json!({
                "p_email": email,
                "p_password": password,
            }));

        let envelope = self.send(&spec).await?;

        match envelope.status_code {
            200 => {
                info!("Authenticated {}", email);
                Ok(AuthOutcome {
                    succeeded: true,
                    envelope,
                })
            }
            400 | 401 => {
                warn!(
                    "Authentication failed for {}: {}",
                    email,
                    envelope.message().unwrap_or("no detail")
                );
                tokio::time::sleep(Duration::from_millis(self.config.failure_delay_ms)).await;
                Ok(AuthOutcome {
                    succeeded: false,
                    envelope,
                })
            }
            status => Err(ClientError::UnsupportedResponse(status)),
        }
    }
}

/// Result of a login attempt
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub succeeded: bool,
    pub envelope: ResponseEnvelope,
}

impl AuthOutcome {
    /// The issued token, on success
    pub fn auth_token(&self) -> Option<&str> {
        if self.succeeded {
            self.envelope.string_field("authToken")
        } else {
            None
        }
    }
}

impl RequestSpec {
    /// Attach the token from a successful login; a failed one leaves the spec unchanged
    #[must_use]
    pub fn authenticated(self, outcome: &AuthOutcome) -> Self {
        match outcome.auth_token() {
            Some(token) => self.auth_token(token),
            None => self,
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ResponseBody;

    // Nothing listens on port 1
    const UNREACHABLE: &str = "http://127.0.0.1:1/";

    fn client() -> PostgrestClient {
        PostgrestClient::new(&ClientConfig {
            timeout_secs: 5,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_transport_failure_is_internal_error() {
        let client = client();
        let envelope = client
            .send(&RequestSpec::new(UNREACHABLE, "movies"))
            .await
            .unwrap();

        assert_eq!(envelope, ResponseEnvelope::internal_error());
    }

    #[tokio::test]
    async fn test_invalid_request_is_error() {
        let client = client();
        let result = client.send(&RequestSpec::new("nonsense", "movies")).await;
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_login_against_unreachable_server_is_unsupported() {
        let client = client();
        let result = client
            .authenticate_user(UNREACHABLE, "f_login", "user@email.com", "password")
            .await;
        assert!(matches!(result, Err(ClientError::UnsupportedResponse(500))));
    }

    #[test]
    fn test_auth_token_only_on_success() {
        let mut body = serde_json::Map::new();
        body.insert("authToken".to_string(), json!("abc"));
        let envelope = ResponseEnvelope {
            status_code: 200,
            body: ResponseBody::Object(body),
            range: None,
            content_location: None,
        };

        let outcome = AuthOutcome {
            succeeded: true,
            envelope: envelope.clone(),
        };
        assert_eq!(outcome.auth_token(), Some("abc"));
        let spec = RequestSpec::new("http://localhost:8001/", "movies").authenticated(&outcome);
        assert_eq!(spec.auth_token.as_deref(), Some("abc"));

        let outcome = AuthOutcome {
            succeeded: false,
            envelope,
        };
        assert_eq!(outcome.auth_token(), None);
        let spec = RequestSpec::new("http://localhost:8001/", "movies").authenticated(&outcome);
        assert!(spec.auth_token.is_none());
    }

    #[test]
    fn test_request_uses_config() {
        let client = PostgrestClient::new(&ClientConfig {
            base_url: "http://db.internal:3000/".to_string(),
            schema: "films".to_string(),
            ..Default::default()
        })
        .unwrap();

        let spec = client.request("movies");
        assert_eq!(spec.base_url, "http://db.internal:3000/");
        assert_eq!(spec.schema, "films");
    }
}
