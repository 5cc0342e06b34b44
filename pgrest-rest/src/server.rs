//! REST API server implementation

use actix_cors::Cors;
use actix_web::dev::ServerHandle;
use actix_web::{middleware, web, App, HttpServer};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use pgrest_auth::handlers::{login, AuthState};
use pgrest_common::config::{DatabaseConfig, ServerConfig};
use pgrest_common::error::{Error, Result};

use crate::handlers::{self, RestState};
use crate::store::{RecordStore, SqliteStore};

/// PostgREST-style records server
pub struct RestServer {
    config: ServerConfig,
    state: Arc<RestState>,
}

impl RestServer {
    /// Create a server over a SQLite store opened from `database`
    pub fn new(
        config: &ServerConfig,
        database: &DatabaseConfig,
        auth_state: Arc<AuthState>,
    ) -> Result<Self> {
        let store = SqliteStore::from_config(database)?;
        Self::with_store(config, Arc::new(store), auth_state)
    }

    /// Create a server over an existing store
    pub fn with_store(
        config: &ServerConfig,
        store: Arc<dyn RecordStore>,
        auth_state: Arc<AuthState>,
    ) -> Result<Self> {
        let table = store.table().name;
        if table != config.resource {
            return Err(Error::ConfigError(format!(
                "resource \"{}\" is not served by this store (expected \"{table}\")",
                config.resource
            )));
        }

        Ok(Self {
            config: config.clone(),
            state: Arc::new(RestState::new(store, auth_state)),
        })
    }

    #[must_use]
    pub fn state(&self) -> Arc<RestState> {
        self.state.clone()
    }

    fn http_server(&self) -> Result<(actix_web::dev::Server, Vec<SocketAddr>)> {
        let state = self.state.clone();
        let auth_state = self.state.auth.clone();

        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(state.clone()))
                .app_data(web::Data::new(auth_state.clone()))
                .wrap(Cors::permissive())
                .wrap(middleware::Logger::default())
                .configure(routes)
        })
        .workers(self.config.workers.max(1))
        .bind((self.config.host.as_str(), self.config.port))?;

        let addrs = server.addrs();
        Ok((server.run(), addrs))
    }

    /// Bind and serve in the background
    pub fn start(&self) -> Result<RunningServer> {
        let (server, addrs) = self.http_server()?;
        let handle = server.handle();
        let task = tokio::spawn(server);

        for addr in &addrs {
            info!("REST API listening on http://{}", addr);
        }

        Ok(RunningServer { addrs, handle, task })
    }

    /// Serve until the server is stopped
    pub async fn run(&self) -> Result<()> {
        info!(
            "Starting REST API server on {}:{}",
            self.config.host, self.config.port
        );
        info!("  Resource: /{}/", self.config.resource);
        info!("  Login:    /rpc/{}/", self.state.auth.login_function);

        let (server, _) = self.http_server()?;
        server.await?;
        Ok(())
    }
}

/// Route table; login comes first so `/rpc/...` never reaches the record route
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(vec!["/rpc/{function}", "/rpc/{function}/"]).route(web::route().to(login)),
    )
    .service(
        web::resource(vec!["/{resource}", "/{resource}/"])
            .route(web::route().to(handlers::collection_handler)),
    )
    .route(
        "/{resource}/{id}",
        web::route().to(handlers::record_handler),
    );
}

/// A server running in the background
pub struct RunningServer {
    addrs: Vec<SocketAddr>,
    handle: ServerHandle,
    task: JoinHandle<std::io::Result<()>>,
}

impl RunningServer {
    /// First bound address
    pub fn addr(&self) -> Option<SocketAddr> {
        self.addrs.first().copied()
    }

    pub fn addrs(&self) -> &[SocketAddr] {
        &self.addrs
    }

    /// Base URL of the first bound address, with a trailing slash
    pub fn base_url(&self) -> Option<String> {
        self.addr().map(|addr| format!("http://{addr}/"))
    }

    /// Graceful shutdown; waits for in-flight requests
    pub async fn stop(self) -> Result<()> {
        self.handle.stop(true).await;
        match self.task.await {
            Ok(result) => result.map_err(Error::from),
            Err(e) => {
                warn!("Server task ended abnormally: {}", e);
                Err(Error::IoError(std::io::Error::other(e)))
            }
        }
    }
}
