//! PostgREST Stub Authentication Service
//!
//! Provides the authentication stub used by the filtering server:
//! - A single fixed email/password pair exchanged for a fixed bearer token
//! - The `/rpc/<login-function>` handler
//! - Bearer-token checks for protected resources
//! - The JSON error responder shared by every handler

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod credentials;
pub mod handlers;
pub mod middleware;

pub use credentials::Authenticator;
pub use handlers::{error_response, AuthState, LoginResponse};
