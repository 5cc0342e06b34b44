//! Configuration types for the PostgREST stub

use serde::{Deserialize, Serialize};

/// Main configuration for server and client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StubConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Authentication stub configuration
    pub auth: AuthConfig,
    /// Storage engine configuration
    pub database: DatabaseConfig,
    /// Protocol client configuration
    pub client: ClientConfig,
}

/// REST server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to (default: 8001, 0 picks an ephemeral port)
    pub port: u16,
    /// Name of the exposed resource
    pub resource: String,
    /// Name of the login RPC function under `/rpc/`
    pub login_function: String,
    /// Number of HTTP worker threads
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8001,
            resource: "movies".to_string(),
            login_function: "f_login".to_string(),
            workers: 4,
        }
    }
}

/// Authentication stub configuration
///
/// A single fixed credential pair maps to a single opaque bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub email: String,
    pub password: String,
    pub token: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            email: "user@email.com".to_string(),
            password: "password".to_string(),
            token: "Pd1WuMdnkuZ4pXZZGyhCTsT0Y0K4Ql".to_string(),
        }
    }
}

/// Storage engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file; a private in-memory database when unset
    pub path: Option<String>,
    /// Populate the table with the demo movie set on startup
    pub seed_demo_data: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            seed_demo_data: true,
        }
    }
}

/// Protocol client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every request is resolved against
    pub base_url: String,
    /// Schema profile sent with each request
    pub schema: String,
    /// Transport timeout in seconds
    pub timeout_secs: u64,
    /// Delay before reporting a failed login, in milliseconds
    pub failure_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001/".to_string(),
            schema: "public".to_string(),
            timeout_secs: 30,
            failure_delay_ms: 1000,
        }
    }
}
