//! Fixed credential verification

use serde_json::Value;
use tracing::{debug, warn};

use pgrest_common::config::AuthConfig;
use pgrest_common::error::{Error, Result};

/// Maps one credential pair to one opaque bearer token.
#[derive(Debug, Clone)]
pub struct Authenticator {
    email: String,
    password: String,
    token: String,
}

impl Authenticator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            email: config.email.clone(),
            password: config.password.clone(),
            token: config.token.clone(),
        }
    }

    /// The bearer token issued on a successful login
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Exchange a login request body for the bearer token.
    ///
    /// The body must be a JSON object; `p_email` and `p_password` must both be
    /// strings matching the configured pair. A missing field is reported the
    /// same way as a wrong one.
    pub fn login(&self, body: &[u8]) -> Result<String> {
        let request: Value = serde_json::from_slice(body).map_err(|e| {
            debug!("Login body is not JSON: {}", e);
            Error::MalformedBody
        })?;

        let fields = request.as_object().ok_or(Error::MalformedBody)?;

        let email = fields.get("p_email").and_then(Value::as_str);
        let password = fields.get("p_password").and_then(Value::as_str);

        match (email, password) {
            (Some(email), Some(password)) if email == self.email && password == self.password => {
                Ok(self.token.clone())
            }
            _ => {
                warn!("Login failed for {:?}", email);
                Err(Error::InvalidCredentials)
            }
        }
    }

    /// Check an `Authorization` header value against the issued token
    pub fn authorize(&self, authorization: Option<&str>) -> Result<()> {
        match authorization.and_then(|value| value.strip_prefix("Bearer ")) {
            Some(token) if token == self.token => Ok(()),
            _ => Err(Error::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> Authenticator {
        Authenticator::new(&AuthConfig::default())
    }

    #[test]
    fn test_login_success() {
        let token = authenticator()
            .login(br#"{"p_email": "user@email.com", "p_password": "password"}"#)
            .unwrap();
        assert_eq!(token, "Pd1WuMdnkuZ4pXZZGyhCTsT0Y0K4Ql");
    }

    #[test]
    fn test_login_wrong_password() {
        let result =
            authenticator().login(br#"{"p_email": "user@email.com", "p_password": "nope"}"#);
        assert!(matches!(result, Err(Error::InvalidCredentials)));
    }

    #[test]
    fn test_login_missing_field() {
        let result = authenticator().login(br#"{"p_email": "user@email.com"}"#);
        assert!(matches!(result, Err(Error::InvalidCredentials)));

        let result = authenticator().login(br#"{"p_email": 1, "p_password": "password"}"#);
        assert!(matches!(result, Err(Error::InvalidCredentials)));
    }

    #[test]
    fn test_login_malformed_body() {
        assert!(matches!(
            authenticator().login(b"not json"),
            Err(Error::MalformedBody)
        ));
        assert!(matches!(authenticator().login(b""), Err(Error::MalformedBody)));
        assert!(matches!(
            authenticator().login(b"[1, 2]"),
            Err(Error::MalformedBody)
        ));
    }

    #[test]
    fn test_authorize() {
        let auth = authenticator();
        assert!(auth
            .authorize(Some("Bearer Pd1WuMdnkuZ4pXZZGyhCTsT0Y0K4Ql"))
            .is_ok());
        assert!(auth.authorize(None).is_err());
        assert!(auth.authorize(Some("Pd1WuMdnkuZ4pXZZGyhCTsT0Y0K4Ql")).is_err());
        assert!(auth.authorize(Some("Bearer wrong")).is_err());
        assert!(auth.authorize(Some("Basic abc")).is_err());
    }
}
