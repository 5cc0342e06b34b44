//! Request-scoped predicate accumulation and SQL rendering
//!
//! A [`FilterClause`] is built fresh for every request and threaded through
//! the parser, the executor and the range calculator. Predicates keep their
//! insertion order, which is both the clause order and the parameter binding
//! order: placeholder `N` binds the value of predicate `N`.

use std::fmt;

use crate::operators::{ColumnSpec, FilterOperator, TableSpec};

/// A filter value ready for binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundValue {
    Integer(i64),
    Text(String),
}

impl BoundValue {
    /// Integer when the raw value parses as one, text otherwise.
    ///
    /// The integer attempt always comes first, so a numeric-looking value
    /// aimed at a text column still binds as an integer.
    pub fn from_raw(raw: &str) -> Self {
        raw.parse::<i64>()
            .map_or_else(|_| Self::Text(raw.to_string()), Self::Integer)
    }
}

impl fmt::Display for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
        }
    }
}

/// One `column op ?` condition with its bound value
#[derive(Debug, Clone)]
pub struct Predicate {
    pub column: &'static ColumnSpec,
    pub operator: FilterOperator,
    pub value: BoundValue,
}

impl Predicate {
    fn to_sql(&self) -> String {
        format!("{} {} ?", self.column.name, self.operator.sql())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse a direction modifier; the empty string means ascending
    pub fn from_modifier(modifier: &str) -> Option<Self> {
        match modifier {
            "asc" | "" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Ordering directive; at most one per request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderDirective {
    pub column: &'static str,
    pub direction: SortDirection,
}

/// Accumulated WHERE predicates and ordering for one request
#[derive(Debug, Clone, Default)]
pub struct FilterClause {
    predicates: Vec<Predicate>,
    order: Option<OrderDirective>,
}

impl FilterClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clause selecting a single row by primary key
    pub fn primary_key(table: &'static TableSpec, id: i64) -> Self {
        let mut clause = Self::new();
        if let Some(column) = table.column(table.primary_key) {
            clause.push(column, FilterOperator::Eq, BoundValue::Integer(id));
        }
        clause
    }

    pub fn push(&mut self, column: &'static ColumnSpec, operator: FilterOperator, value: BoundValue) {
        self.predicates.push(Predicate {
            column,
            operator,
            value,
        });
    }

    /// Replace the ordering directive; the last one set wins
    pub fn set_order(&mut self, order: OrderDirective) {
        self.order = Some(order);
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn order(&self) -> Option<&OrderDirective> {
        self.order.as_ref()
    }

    /// Bound values in placeholder order
    pub fn bound_values(&self) -> impl Iterator<Item = &BoundValue> {
        self.predicates.iter().map(|p| &p.value)
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty() && self.order.is_none()
    }

    /// `WHERE a = ? AND b > ?`, or an empty string without predicates
    pub fn where_sql(&self) -> String {
        if self.predicates.is_empty() {
            return String::new();
        }

        let conditions: Vec<String> = self.predicates.iter().map(Predicate::to_sql).collect();
        format!("WHERE {}", conditions.join(" AND "))
    }

    /// `ORDER BY col ASC`, or an empty string without a directive
    pub fn order_sql(&self) -> String {
        self.order
            .map(|o| format!("ORDER BY {} {}", o.column, o.direction.sql()))
            .unwrap_or_default()
    }

    /// `SELECT * FROM <table> <WHERE> <ORDER BY>;`
    pub fn selection_sql(&self, table: &TableSpec) -> String {
        let mut sql = format!("SELECT * FROM {}", table.name);
        for fragment in [self.where_sql(), self.order_sql()] {
            if !fragment.is_empty() {
                sql.push(' ');
                sql.push_str(&fragment);
            }
        }
        sql.push(';');
        sql
    }
}
