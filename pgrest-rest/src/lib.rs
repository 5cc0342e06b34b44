//! PostgREST Stub REST Service
//!
//! Translates PostgREST-style query strings into parameterized SQL and serves
//! the results:
//! - Whitelisted filters (eq, neq, lt, gt, lte, gte) per column
//! - A single `order=<column>.<asc|desc>` directive
//! - `Content-Range` computation over the filtered rows
//! - Bearer-protected collection and single-record endpoints

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod filter;
pub mod handlers;
pub mod operators;
pub mod predicate;
pub mod range;
pub mod server;
pub mod store;

pub use filter::{parse_query_string, FilterParameter};
pub use handlers::RestState;
pub use operators::{ColumnSpec, ColumnType, FilterOperator, TableSpec, MOVIES};
pub use predicate::{BoundValue, FilterClause, OrderDirective, SortDirection};
pub use range::RangeResult;
pub use server::{RestServer, RunningServer};
pub use store::{RecordStore, SqliteStore};
