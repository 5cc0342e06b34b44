//! HTTP handlers for the login RPC

use actix_web::{http::Method, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use pgrest_common::config::AuthConfig;
use pgrest_common::error::Error;
use pgrest_common::types::ApiError;

use crate::credentials::Authenticator;

/// Shared auth state
pub struct AuthState {
    pub authenticator: Authenticator,
    pub login_function: String,
}

impl AuthState {
    pub fn new(config: &AuthConfig, login_function: impl Into<String>) -> Self {
        Self {
            authenticator: Authenticator::new(config),
            login_function: login_function.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "authToken")]
    pub auth_token: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /rpc/{function}
pub async fn login(
    state: web::Data<Arc<AuthState>>,
    path: web::Path<String>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    let function = path.into_inner();

    if function != state.login_function {
        return error_response(&Error::ResourceNotFound(format!("rpc/{function}")));
    }

    if *req.method() != Method::POST {
        warn!("Rejected {} request to rpc/{}", req.method(), function);
        return error_response(&Error::MethodNotAllowed(req.method().to_string()));
    }

    match state.authenticator.login(&body) {
        Ok(auth_token) => {
            info!("Issued auth token via rpc/{}", function);
            HttpResponse::Ok().json(LoginResponse { auth_token })
        }
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Render an error as its JSON body with the matching status
pub fn error_response(error: &Error) -> HttpResponse {
    let api_error = ApiError::from(error);

    match error.status_code() {
        400 => HttpResponse::BadRequest().json(api_error),
        401 => HttpResponse::Unauthorized().json(api_error),
        404 => HttpResponse::NotFound().json(api_error),
        405 => HttpResponse::MethodNotAllowed().json(api_error),
        _ => HttpResponse::InternalServerError().json(api_error),
    }
}
