//! PostgREST Stub Common Types and Utilities
//!
//! Shared types, configuration, and error handling for the filtering server
//! and its protocol client.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod encoding;
pub mod error;
pub mod types;

pub use config::StubConfig;
pub use error::{Error, Result};
