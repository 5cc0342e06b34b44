//! Protocol-compliant request construction
//!
//! [`prepare`] is pure: it turns a [`RequestSpec`] into the exact URL, headers
//! and body to send, without touching the network.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value as JsonValue;
use url::Url;

use pgrest_common::config::ClientConfig;

use crate::error::{ClientError, Result};
use crate::method::RequestMethod;

/// Everything needed to issue one protocol request
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub base_url: String,
    pub resource: String,
    /// Single-record lookup, appended after the resource
    pub resource_id: Option<String>,
    pub method: RequestMethod,
    /// With or without a leading `?`
    pub query_string: Option<String>,
    /// Applied last; replaces a default header of the same name
    pub headers: Vec<(String, String)>,
    pub body: Option<JsonValue>,
    pub schema: String,
    pub auth_token: Option<String>,
    pub commit_transaction: bool,
}

impl RequestSpec {
    pub fn new(base_url: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            resource: resource.into(),
            resource_id: None,
            method: RequestMethod::Get,
            query_string: None,
            headers: Vec::new(),
            body: None,
            schema: "public".to_string(),
            auth_token: None,
            commit_transaction: true,
        }
    }

    /// Base URL and schema taken from client configuration
    pub fn from_config(config: &ClientConfig, resource: impl Into<String>) -> Self {
        Self::new(config.base_url.clone(), resource).schema(config.schema.clone())
    }

    #[must_use]
    pub fn method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn query(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = Some(query_string.into());
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    #[must_use]
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn commit_transaction(mut self, commit: bool) -> Self {
        self.commit_transaction = commit;
        self
    }
}

/// A request ready to hand to the transport
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: RequestMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Build the URL, headers and body for `spec`
pub fn prepare(spec: &RequestSpec) -> Result<PreparedRequest> {
    let properties = spec.method.properties();

    let url = request_url(spec)?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("prefer"),
        header_value(&prefer_header(spec))?,
    );
    headers.insert(
        header_name(properties.profile.header_name())?,
        header_value(&spec.schema)?,
    );
    if let Some(token) = &spec.auth_token {
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
    }
    for (name, value) in &spec.headers {
        headers.insert(header_name(name)?, header_value(value)?);
    }

    let body = properties.body_expected.then(|| {
        spec.body
            .as_ref()
            .map_or_else(|| "{}".to_string(), JsonValue::to_string)
    });

    Ok(PreparedRequest {
        method: spec.method,
        url,
        headers,
        body,
    })
}

/// `count=exact, return=<minimal|representation>, tx=<commit|rollback>`
fn prefer_header(spec: &RequestSpec) -> String {
    format!(
        "count=exact, return={}, tx={}",
        spec.method.properties().response_return,
        if spec.commit_transaction {
            "commit"
        } else {
            "rollback"
        }
    )
}

fn request_url(spec: &RequestSpec) -> Result<Url> {
    let mut raw = spec.base_url.clone();
    if !raw.ends_with('/') {
        raw.push('/');
    }

    raw.push_str(spec.resource.trim_matches('/'));
    raw.push('/');
    if let Some(id) = &spec.resource_id {
        raw.push_str(id.trim_matches('/'));
    }

    let query = normalize_query(spec.query_string.as_deref());
    raw.push_str(&query);

    Url::parse(&raw).map_err(|e| ClientError::InvalidUrl(format!("{raw}: {e}")))
}

/// Strip any leading `?` and re-add exactly one; empty stays empty
pub fn normalize_query(query_string: Option<&str>) -> String {
    match query_string.map(|q| q.trim_start_matches('?')) {
        Some(q) if !q.is_empty() => format!("?{q}"),
        _ => String::new(),
    }
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| ClientError::InvalidHeader(name.to_string()))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader(value.to_string()))
}
