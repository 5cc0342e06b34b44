//! Content-Range computation over the filtered result set

use std::fmt;

use crate::operators::TableSpec;
use crate::predicate::FilterClause;

/// Zero-based inclusive row span plus the total match count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeResult {
    pub from: i64,
    pub to: i64,
    pub total: i64,
}

impl RangeResult {
    /// The range of an empty match
    pub fn empty() -> Self {
        Self {
            from: -1,
            to: -1,
            total: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// `from-to/total`, or `*/0` for an empty match
impl fmt::Display for RangeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "*/{}", self.total)
        } else {
            write!(f, "{}-{}/{}", self.from, self.to, self.total)
        }
    }
}

/// Range query sharing the clause's predicates and ordering.
///
/// Rows are numbered with `ROW_NUMBER()` under the requested ordering, so the
/// bound values are the same, in the same order, as for the selection query.
pub fn range_sql(table: &TableSpec, clause: &FilterClause) -> String {
    let mut inner = format!(
        "SELECT ROW_NUMBER() OVER ({}) AS row_num FROM {}",
        clause.order_sql(),
        table.name
    );
    let where_sql = clause.where_sql();
    if !where_sql.is_empty() {
        inner.push(' ');
        inner.push_str(&where_sql);
    }

    format!(
        "SELECT COALESCE(MIN(row_num), 0) - 1 AS range_from, \
         COALESCE(MAX(row_num), 0) - 1 AS range_to, \
         COUNT(*) AS range_total \
         FROM ({inner}) AS numbered;"
    )
}
