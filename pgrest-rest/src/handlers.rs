//! HTTP handlers for the records endpoints

use actix_web::http::{header, Method};
use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::{info, warn};

use pgrest_auth::middleware::require_bearer;
use pgrest_auth::{error_response, AuthState};
use pgrest_common::error::{Error, Result};
use pgrest_common::types::Movie;

use crate::filter::parse_query_string;
use crate::predicate::FilterClause;
use crate::range::RangeResult;
use crate::store::RecordStore;

/// Shared REST API state
pub struct RestState {
    pub store: Arc<dyn RecordStore>,
    pub auth: Arc<AuthState>,
}

impl RestState {
    pub fn new(store: Arc<dyn RecordStore>, auth: Arc<AuthState>) -> Self {
        Self { store, auth }
    }

    /// Name of the exposed resource
    pub fn resource(&self) -> &'static str {
        self.store.table().name
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /{resource}
pub async fn collection_handler(
    state: web::Data<Arc<RestState>>,
    path: web::Path<String>,
    req: HttpRequest,
) -> HttpResponse {
    let resource = path.into_inner();

    match select_collection(&state, &resource, &req).await {
        Ok((movies, range)) => records_response(&req, &movies, range),
        Err(e) => failure_response(&req, &e),
    }
}

/// GET /{resource}/{id}
pub async fn record_handler(
    state: web::Data<Arc<RestState>>,
    path: web::Path<(String, String)>,
    req: HttpRequest,
) -> HttpResponse {
    let (resource, id) = path.into_inner();

    match select_record(&state, &resource, &id, &req).await {
        Ok((movies, range)) => records_response(&req, &movies, range),
        Err(e) => failure_response(&req, &e),
    }
}

async fn select_collection(
    state: &RestState,
    resource: &str,
    req: &HttpRequest,
) -> Result<(Vec<Movie>, RangeResult)> {
    authorize(state, resource, req)?;

    let clause = parse_query_string(state.store.table(), req.query_string())?;
    let movies = state.store.select(&clause).await?;
    let range = state.store.count_range(&clause).await?;

    info!("Returning {} {} ({})", movies.len(), resource, range);
    Ok((movies, range))
}

async fn select_record(
    state: &RestState,
    resource: &str,
    id: &str,
    req: &HttpRequest,
) -> Result<(Vec<Movie>, RangeResult)> {
    authorize(state, resource, req)?;

    let id: i64 = id
        .parse()
        .map_err(|_| Error::InvalidResourceId(id.to_string()))?;

    let movies = state.store.select_by_id(id).await?;
    let range = state
        .store
        .count_range(&FilterClause::primary_key(state.store.table(), id))
        .await?;

    info!("Returning {}/{} ({})", resource, id, range);
    Ok((movies, range))
}

/// Method, resource and bearer checks, in that order
fn authorize(state: &RestState, resource: &str, req: &HttpRequest) -> Result<()> {
    if *req.method() != Method::GET {
        return Err(Error::MethodNotAllowed(req.method().to_string()));
    }

    if resource != state.resource() {
        return Err(Error::ResourceNotFound(resource.to_string()));
    }

    require_bearer(req, &state.auth.authenticator)
}

// ============================================================================
// Helpers
// ============================================================================

fn records_response(req: &HttpRequest, movies: &[Movie], range: RangeResult) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "application/json; charset=UTF-8"))
        .insert_header((header::CONTENT_LOCATION, req.uri().to_string()))
        .insert_header((header::CONTENT_RANGE, range.to_string()))
        .insert_header(("Range-Units", "items"))
        .body(serde_json::to_string(movies).unwrap_or_else(|_| "[]".to_string()))
}

fn failure_response(req: &HttpRequest, error: &Error) -> HttpResponse {
    if error.is_protocol_violation() {
        info!("Rejected {} {}: {}", req.method(), req.uri(), error);
    } else {
        warn!(
            "{} {} failed with {}: {}",
            req.method(),
            req.uri(),
            error.status_code(),
            error
        );
    }
    error_response(error)
}
