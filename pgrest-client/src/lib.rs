//! PostgREST Stub Protocol Client
//!
//! Builds protocol-compliant requests and decodes the response envelope:
//! - Per-method `Prefer` and schema-profile headers
//! - Query string normalization
//! - `Content-Range` decoding into 1-based record ranges
//! - The `rpc/<function>` login flow with a delayed failure report

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod client;
pub mod error;
pub mod method;
pub mod request;
pub mod response;

pub use client::{AuthOutcome, PostgrestClient};
pub use error::{ClientError, Result};
pub use method::{MethodProperties, ProfileHeader, RequestMethod};
pub use request::{prepare, PreparedRequest, RequestSpec};
pub use response::{parse_content_range, RecordRange, ResponseBody, ResponseEnvelope};
