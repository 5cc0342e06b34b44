//! PostgREST-style filtering server and protocol client
//!
//! This crate wires the member crates into one deployable stub:
//!
//! # Features
//!
//! - **Filter translation** - query strings become parameterized SQL
//! - **Range metadata** - `Content-Range` over the filtered rows
//! - **Login stub** - a fixed credential pair for a fixed bearer token
//! - **Protocol client** - request shaping and response envelope decoding

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub use pgrest_auth as auth;
pub use pgrest_client as client;
pub use pgrest_common as common;
pub use pgrest_rest as rest;

use std::sync::Arc;
use tracing::info;

use pgrest_auth::AuthState;
use pgrest_client::{ClientError, PostgrestClient};
use pgrest_common::config::StubConfig;
use pgrest_common::error::Result;
use pgrest_rest::{RestServer, RunningServer};

/// The filtering server with its login stub
pub struct StubServer {
    config: StubConfig,
    rest_server: RestServer,
}

impl StubServer {
    /// Create the server, opening and seeding the store
    ///
    /// # Errors
    /// Returns an error if the store cannot be opened or the configured
    /// resource is not served by it.
    pub fn new(config: StubConfig) -> Result<Self> {
        info!("Initializing PostgREST stub");

        let auth_state = Arc::new(AuthState::new(
            &config.auth,
            config.server.login_function.clone(),
        ));
        let rest_server = RestServer::new(&config.server, &config.database, auth_state)?;

        Ok(Self {
            config,
            rest_server,
        })
    }

    #[must_use]
    pub fn rest(&self) -> &RestServer {
        &self.rest_server
    }

    #[must_use]
    pub fn config(&self) -> &StubConfig {
        &self.config
    }

    /// Protocol client built from the `client` section
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn client(&self) -> std::result::Result<PostgrestClient, ClientError> {
        PostgrestClient::new(&self.config.client)
    }

    /// Bind and serve in the background
    ///
    /// # Errors
    /// Returns an error if the listener cannot be bound.
    pub fn start(&self) -> Result<RunningServer> {
        self.rest_server.start()
    }

    /// Serve until stopped
    ///
    /// # Errors
    /// Returns an error if the listener cannot be bound or the server fails.
    pub async fn run(&self) -> Result<()> {
        info!("Starting PostgREST stub services");
        info!(
            "  - REST service: http://{}:{}/{}/",
            self.config.server.host, self.config.server.port, self.config.server.resource
        );
        self.rest_server.run().await
    }

    /// Shutdown hook for the binary
    ///
    /// # Errors
    /// Currently infallible.
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down PostgREST stub");
        Ok(())
    }
}
