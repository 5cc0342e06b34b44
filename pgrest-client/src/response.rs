//! Response envelope decoding

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use pgrest_common::encoding::url_decode;

use crate::error::{ClientError, Result};
use crate::method::RequestMethod;

/// `from-to/total` with an unknown total written as `*`
static CONTENT_RANGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)-(\d+)/(\d+|\*)$").expect("content range pattern is valid")
});

/// 1-based inclusive record span and total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RecordRange {
    pub from: i64,
    pub to: i64,
    /// Zero when the server reported `*`
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Array(Vec<JsonValue>),
    Object(Map<String, JsonValue>),
    Empty,
}

/// Normalized view of one protocol response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub body: ResponseBody,
    /// Present for successful GET requests only
    pub range: Option<RecordRange>,
    /// URL-decoded `Content-Location`, on success only
    pub content_location: Option<String>,
}

impl ResponseEnvelope {
    /// Decode a raw response to a request issued with `method`
    pub fn from_parts(
        method: RequestMethod,
        status_code: u16,
        content_range: Option<&str>,
        content_location: Option<&str>,
        body: &str,
    ) -> Result<Self> {
        if is_error_status(status_code) {
            return Ok(Self {
                status_code,
                body: parse_error_body(body)?,
                range: None,
                content_location: None,
            });
        }

        let body = parse_body(body)?;

        let range = if method.properties().range_expected {
            match &body {
                ResponseBody::Array(rows) if rows.is_empty() => Some(RecordRange::default()),
                _ => Some(parse_content_range(content_range.unwrap_or_default())?),
            }
        } else {
            None
        };

        let content_location = content_location
            .map(|raw| {
                url_decode(raw).ok_or_else(|| ClientError::InvalidHeader(raw.to_string()))
            })
            .transpose()?;

        Ok(Self {
            status_code,
            body,
            range,
            content_location,
        })
    }

    /// Synthetic envelope for a failed transport
    pub fn internal_error() -> Self {
        Self {
            status_code: 500,
            body: ResponseBody::Empty,
            range: None,
            content_location: None,
        }
    }

    pub fn is_error(&self) -> bool {
        is_error_status(self.status_code)
    }

    /// The `message` field of an object body
    pub fn message(&self) -> Option<&str> {
        self.string_field("message")
    }

    /// String field of an object body
    pub fn string_field(&self, key: &str) -> Option<&str> {
        match &self.body {
            ResponseBody::Object(map) => map.get(key).and_then(JsonValue::as_str),
            _ => None,
        }
    }

    /// Deserialize an array body into records
    pub fn records<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        match &self.body {
            ResponseBody::Array(rows) => rows
                .iter()
                .map(|row| serde_json::from_value(row.clone()).map_err(ClientError::from))
                .collect(),
            ResponseBody::Empty => Ok(Vec::new()),
            ResponseBody::Object(_) => Err(ClientError::UnsupportedBody(
                "expected an array of records, got an object".to_string(),
            )),
        }
    }
}

fn is_error_status(status_code: u16) -> bool {
    status_code >= 400
}

/// Array or object by first character; anything else is treated as empty
fn parse_body(raw: &str) -> Result<ResponseBody> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('[') {
        Ok(ResponseBody::Array(serde_json::from_str(trimmed)?))
    } else if trimmed.starts_with('{') {
        Ok(ResponseBody::Object(serde_json::from_str(trimmed)?))
    } else {
        Ok(ResponseBody::Empty)
    }
}

/// Error bodies must be objects
fn parse_error_body(raw: &str) -> Result<ResponseBody> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(ResponseBody::Empty);
    }
    if !trimmed.starts_with('{') {
        return Err(ClientError::UnsupportedBody(trimmed.chars().take(64).collect()));
    }
    Ok(ResponseBody::Object(serde_json::from_str(trimmed)?))
}

/// Parse a `Content-Range` value, shifting the 0-based bounds to 1-based
pub fn parse_content_range(value: &str) -> Result<RecordRange> {
    let invalid = || ClientError::InvalidContentRange(value.to_string());

    let captures = CONTENT_RANGE_PATTERN.captures(value).ok_or_else(invalid)?;

    let bound = |i: usize| -> Result<i64> {
        captures[i]
            .parse::<i64>()
            .ok()
            .and_then(|v| v.checked_add(1))
            .ok_or_else(invalid)
    };

    let total = match &captures[3] {
        "*" => 0,
        count => count.parse::<i64>().map_err(|_| invalid())?,
    };

    Ok(RecordRange {
        from: bound(1)?,
        to: bound(2)?,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_content_range() {
        assert_eq!(
            parse_content_range("0-2/3").unwrap(),
            RecordRange {
                from: 1,
                to: 3,
                total: 3
            }
        );
        assert_eq!(
            parse_content_range("10-19/*").unwrap(),
            RecordRange {
                from: 11,
                to: 20,
                total: 0
            }
        );
    }

    #[test]
    fn test_invalid_content_range() {
        for value in ["", "*/0", "0-2", "a-b/3", "0-2/3 ", "items 0-2/3"] {
            assert!(
                matches!(
                    parse_content_range(value),
                    Err(ClientError::InvalidContentRange(_))
                ),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_get_success() {
        let envelope = ResponseEnvelope::from_parts(
            RequestMethod::Get,
            200,
            Some("0-0/1"),
            Some("/movies/?title=eq.Am%C3%A9lie"),
            r#"[{"id":150,"title":"Amélie","runningMins":123}]"#,
        )
        .unwrap();

        assert!(!envelope.is_error());
        assert_eq!(
            envelope.range,
            Some(RecordRange {
                from: 1,
                to: 1,
                total: 1
            })
        );
        assert_eq!(
            envelope.content_location.as_deref(),
            Some("/movies/?title=eq.Amélie")
        );

        let rows: Vec<JsonValue> = envelope.records().unwrap();
        assert_eq!(rows[0]["id"], 150);
    }

    #[test]
    fn test_empty_array_skips_range_parsing() {
        let envelope = ResponseEnvelope::from_parts(
            RequestMethod::Get,
            200,
            Some("*/0"),
            Some("/movies/"),
            "[]",
        )
        .unwrap();
        assert_eq!(envelope.range, Some(RecordRange::default()));
        assert_eq!(envelope.body, ResponseBody::Array(vec![]));
    }

    #[test]
    fn test_get_with_bad_range_fails() {
        let result =
            ResponseEnvelope::from_parts(RequestMethod::Get, 200, Some("bogus"), None, "[1]");
        assert!(matches!(result, Err(ClientError::InvalidContentRange(_))));

        let result = ResponseEnvelope::from_parts(RequestMethod::Get, 200, None, None, "[1]");
        assert!(matches!(result, Err(ClientError::InvalidContentRange(_))));
    }

    #[test]
    fn test_non_get_has_no_range() {
        let envelope = ResponseEnvelope::from_parts(
            RequestMethod::Post,
            200,
            Some("bogus"),
            None,
            r#"{"authToken":"abc"}"#,
        )
        .unwrap();
        assert!(envelope.range.is_none());
        assert_eq!(envelope.string_field("authToken"), Some("abc"));
        assert!(envelope.content_location.is_none());
    }

    #[test]
    fn test_error_body_is_object() {
        let envelope = ResponseEnvelope::from_parts(
            RequestMethod::Get,
            401,
            None,
            Some("/movies/"),
            r#"{"code":"unauthorized","message":"Access denied."}"#,
        )
        .unwrap();
        assert!(envelope.is_error());
        assert_eq!(envelope.message(), Some("Access denied."));
        assert!(envelope.range.is_none());
        assert!(envelope.content_location.is_none());

        let envelope =
            ResponseEnvelope::from_parts(RequestMethod::Get, 404, None, None, "").unwrap();
        assert_eq!(envelope.body, ResponseBody::Empty);

        let result = ResponseEnvelope::from_parts(RequestMethod::Get, 500, None, None, "[1]");
        assert!(matches!(result, Err(ClientError::UnsupportedBody(_))));
    }

    #[test]
    fn test_internal_error_envelope() {
        let envelope = ResponseEnvelope::internal_error();
        assert_eq!(envelope.status_code, 500);
        assert!(envelope.is_error());
        assert_eq!(envelope.body, ResponseBody::Empty);
    }

    #[test]
    fn test_envelope_serializes_untagged_body() {
        let envelope = ResponseEnvelope::from_parts(
            RequestMethod::Head,
            200,
            None,
            None,
            r#"{"ok":true}"#,
        )
        .unwrap();
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["body"], json!({"ok": true}));
        assert_eq!(value["status_code"], 200);
    }
}
