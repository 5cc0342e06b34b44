//! Common wire types for the PostgREST stub

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ============================================================================
// Record Types
// ============================================================================

/// One row of the `movies` resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub running_mins: i64,
}

impl Movie {
    pub fn new(id: i64, title: impl Into<String>, running_mins: i64) -> Self {
        Self {
            id,
            title: title.into(),
            running_mins,
        }
    }
}

// ============================================================================
// API Response Types
// ============================================================================

/// Standard API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<&Error> for ApiError {
    fn from(error: &Error) -> Self {
        let api_error = Self::new(error.error_code(), error.to_string());
        match error {
            Error::MalformedFilter(_) => {
                api_error.with_hint("Filters take the form column=operator.value")
            }
            _ => api_error,
        }
    }
}
