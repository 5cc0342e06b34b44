//! Bearer-token guard for protected routes

use actix_web::HttpRequest;
use tracing::debug;

use pgrest_common::error::Result;

use crate::credentials::Authenticator;

/// Raw `Authorization` header value, if present and readable
pub fn authorization_header(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
}

/// Reject the request unless it carries `Authorization: Bearer <token>`
pub fn require_bearer(req: &HttpRequest, authenticator: &Authenticator) -> Result<()> {
    authenticator
        .authorize(authorization_header(req))
        .inspect_err(|_| debug!("Rejected request to {}: bad bearer token", req.path()))
}
