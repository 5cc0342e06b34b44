//! Error types for the PostgREST stub

use thiserror::Error;

/// Server-side error taxonomy
#[derive(Error, Debug)]
pub enum Error {
    // Authentication Errors
    #[error("Invalid or missing email/password details.")]
    InvalidCredentials,

    #[error("Null/incorrect authentication key supplied. Access denied.")]
    Unauthorized,

    // Protocol Errors
    #[error(
        "Query Parameter \"order\" contains illegal direction modifier. Must be .asc, .desc, or omitted."
    )]
    InvalidOrderDirection,

    #[error("Query parameter \"{0}\" does not match the expected format column=operator.value.")]
    MalformedFilter(String),

    #[error("Query parameter \"{0}\" contains an invalid percent-encoded value.")]
    InvalidEncoding(String),

    #[error("Resource identifier \"{0}\" is not a valid integer.")]
    InvalidResourceId(String),

    #[error("Failed to parse request body to JSON.")]
    MalformedBody,

    #[error("Invalid method: {0}.")]
    MethodNotAllowed(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    // Storage Errors
    /// The detail is kept for logging only and never rendered to callers.
    #[error("A query execution error occurred.")]
    QueryExecution(String),

    // General Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for stub operations
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP status code for each error type
impl Error {
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::InvalidOrderDirection
            | Self::MalformedFilter(_)
            | Self::InvalidEncoding(_)
            | Self::InvalidResourceId(_)
            | Self::MalformedBody => 400,

            // 401 Unauthorized
            Self::InvalidCredentials | Self::Unauthorized => 401,

            // 404 Not Found
            Self::ResourceNotFound(_) => 404,

            // 405 Method Not Allowed
            Self::MethodNotAllowed(_) => 405,

            // 500 Internal Server Error
            Self::QueryExecution(_)
            | Self::ConfigError(_)
            | Self::IoError(_)
            | Self::JsonError(_) => 500,
        }
    }

    /// Error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::Unauthorized => "unauthorized",
            Self::InvalidOrderDirection => "invalid_order",
            Self::MalformedFilter(_) => "invalid_filter",
            Self::InvalidEncoding(_) => "invalid_encoding",
            Self::InvalidResourceId(_) => "invalid_resource_id",
            Self::MalformedBody => "invalid_body",
            Self::MethodNotAllowed(_) => "method_not_allowed",
            Self::ResourceNotFound(_) => "not_found",
            Self::QueryExecution(_) => "query_error",
            Self::ConfigError(_) => "config_error",
            Self::IoError(_) => "io_error",
            Self::JsonError(_) => "json_error",
        }
    }

    /// Whether the error is a protocol violation by the caller
    pub fn is_protocol_violation(&self) -> bool {
        self.status_code() == 400
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(Error::InvalidOrderDirection.status_code(), 400);
        assert_eq!(Error::Unauthorized.status_code(), 401);
        assert_eq!(Error::MethodNotAllowed("POST".into()).status_code(), 405);
        assert_eq!(Error::QueryExecution("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_order_direction_message() {
        assert_eq!(
            Error::InvalidOrderDirection.to_string(),
            "Query Parameter \"order\" contains illegal direction modifier. Must be .asc, .desc, or omitted."
        );
    }

    #[test]
    fn test_execution_detail_not_rendered() {
        let error = Error::QueryExecution("no such column: secret".into());
        assert_eq!(error.to_string(), "A query execution error occurred.");
        assert!(!error.is_protocol_violation());
    }

    #[test]
    fn test_method_message() {
        assert_eq!(
            Error::MethodNotAllowed("POST".into()).to_string(),
            "Invalid method: POST."
        );
    }
}
