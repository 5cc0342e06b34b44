//! Query execution against the record store
//!
//! Handlers only see the [`RecordStore`] trait. [`SqliteStore`] is the one
//! engine-backed implementation; its connection is the only state shared
//! between requests and is serialized behind a mutex.

use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, Row};
use tracing::{debug, error, info};

use pgrest_common::config::DatabaseConfig;
use pgrest_common::error::{Error, Result};
use pgrest_common::types::Movie;

use crate::operators::{ColumnType, TableSpec, MOVIES};
use crate::predicate::{BoundValue, FilterClause};
use crate::range::{range_sql, RangeResult};

/// Record store backend
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Rows matching the clause, in the clause's ordering
    async fn select(&self, clause: &FilterClause) -> Result<Vec<Movie>>;

    /// The row with the given primary key, if any
    async fn select_by_id(&self, id: i64) -> Result<Vec<Movie>>;

    /// Range of the rows matching the clause
    async fn count_range(&self, clause: &FilterClause) -> Result<RangeResult>;

    /// The table this store serves
    fn table(&self) -> &'static TableSpec;
}

/// Demo rows seeded into a fresh store
const DEMO_MOVIES: &[(i64, &str, i64)] = &[
    (10, "Terminator 2: Judgement Day", 137),
    (20, "Dune: Part Two", 166),
    (30, "Twelve Monkeys", 129),
    (40, "Inception", 148),
    (50, "Incredibles, The", 115),
    (60, "Groundhog Day", 101),
    (70, "Shawshank Redemption, The", 142),
    (80, "Avengers: Endgame", 181),
    (90, "Matrix, The", 136),
    (100, "Everything Everywhere All at Once", 139),
    (110, "Lord of the Rings: The Fellowship of the Ring, The", 178),
    (120, "Knives Out", 130),
    (130, "Back to the Future Part II", 108),
    (140, "Spider-Man: Across the Spider-Verse", 140),
    (150, "Amélie", 123),
];

/// SQLite-backed store for the `movies` table
pub struct SqliteStore {
    conn: Mutex<Connection>,
    table: &'static TableSpec,
}

impl SqliteStore {
    /// Private in-memory database with the schema in place
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage_error)?;
        Self::with_connection(conn)
    }

    /// File-backed database, created if missing
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening database at {}", path.display());
        let conn = Connection::open(path).map_err(storage_error)?;
        Self::with_connection(conn)
    }

    /// Open and optionally seed according to configuration
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let store = match &config.path {
            Some(path) => Self::open(path)?,
            None => Self::open_in_memory()?,
        };

        if config.seed_demo_data {
            store.seed_demo_data()?;
        }

        Ok(store)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
            table: &MOVIES,
        };
        store.create_schema()?;
        Ok(store)
    }

    fn create_schema(&self) -> Result<()> {
        self.conn
            .lock()
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS movies (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    running_mins INTEGER NOT NULL
                );",
            )
            .map_err(storage_error)
    }

    /// Insert the demo movie set; rows already present are left alone
    pub fn seed_demo_data(&self) -> Result<()> {
        for &(id, title, running_mins) in DEMO_MOVIES {
            self.insert(&Movie::new(id, title, running_mins))?;
        }
        info!("Seeded {} demo movies", DEMO_MOVIES.len());
        Ok(())
    }

    pub fn insert(&self, movie: &Movie) -> Result<()> {
        self.conn
            .lock()
            .execute(
                "INSERT OR IGNORE INTO movies (id, title, running_mins) VALUES (?1, ?2, ?3)",
                (movie.id, &movie.title, movie.running_mins),
            )
            .map(|_| ())
            .map_err(storage_error)
    }

    /// Bind values in placeholder order, enforcing column types
    fn bind(clause: &FilterClause) -> Result<Vec<SqlValue>> {
        clause
            .predicates()
            .iter()
            .map(|p| match (&p.value, p.column.column_type) {
                (BoundValue::Integer(v), _) => Ok(SqlValue::Integer(*v)),
                (BoundValue::Text(v), ColumnType::Text) => Ok(SqlValue::Text(v.clone())),
                (BoundValue::Text(v), ColumnType::Integer) => Err(Error::QueryExecution(format!(
                    "cannot bind text value '{v}' to integer column {}",
                    p.column.name
                ))),
            })
            .collect::<Result<_>>()
            .inspect_err(log_failure)
    }

    fn query_movies(&self, clause: &FilterClause) -> Result<Vec<Movie>> {
        let sql = clause.selection_sql(self.table);
        let params = Self::bind(clause)?;
        info!("Executing SQL: {}", sql);

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql).map_err(storage_error)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), movie_from_row)
            .map_err(storage_error)?;

        let movies = rows.collect::<rusqlite::Result<Vec<_>>>().map_err(storage_error)?;
        debug!("Query returned {} rows", movies.len());
        Ok(movies)
    }

    fn query_range(&self, clause: &FilterClause) -> Result<RangeResult> {
        let sql = range_sql(self.table, clause);
        let params = Self::bind(clause)?;
        debug!("Executing range SQL: {}", sql);

        let conn = self.conn.lock();
        conn.query_row(&sql, params_from_iter(params.iter()), |row| {
            Ok(RangeResult {
                from: row.get("range_from")?,
                to: row.get("range_to")?,
                total: row.get("range_total")?,
            })
        })
        .map_err(storage_error)
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn select(&self, clause: &FilterClause) -> Result<Vec<Movie>> {
        self.query_movies(clause)
    }

    async fn select_by_id(&self, id: i64) -> Result<Vec<Movie>> {
        self.query_movies(&FilterClause::primary_key(self.table, id))
    }

    async fn count_range(&self, clause: &FilterClause) -> Result<RangeResult> {
        self.query_range(clause)
    }

    fn table(&self) -> &'static TableSpec {
        self.table
    }
}

fn movie_from_row(row: &Row<'_>) -> rusqlite::Result<Movie> {
    Ok(Movie {
        id: row.get("id")?,
        title: row.get("title")?,
        running_mins: row.get("running_mins")?,
    })
}

fn storage_error(e: rusqlite::Error) -> Error {
    let error = Error::QueryExecution(e.to_string());
    log_failure(&error);
    error
}

fn log_failure(error: &Error) {
    if let Error::QueryExecution(detail) = error {
        error!("Query execution failed: {}", detail);
    }
}
