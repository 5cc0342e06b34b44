//! Query string parsing for PostgREST-style filters
//!
//! Each `&`-separated segment must have the form `column=operator.value`.
//! The reserved column `order` switches to ordering: its operator slot names
//! the sort column and its value slot holds the direction.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use pgrest_common::encoding::url_decode;
use pgrest_common::error::{Error, Result};

use crate::operators::TableSpec;
use crate::predicate::{BoundValue, FilterClause, OrderDirective, SortDirection};

/// Expected shape of one query string segment
static SEGMENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\??([a-zA-Z_]+)=([a-z_]+)\.(.*)$").expect("segment pattern is valid")
});

/// Reserved column name selecting ordering semantics
const ORDER_PARAMETER: &str = "order";

/// One parsed query string segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParameter {
    pub column: String,
    pub operator: String,
    /// URL-decoded value; empty when the segment ends at the dot
    pub value: String,
}

impl FilterParameter {
    /// Parse a single segment, rejecting anything outside the grammar
    pub fn parse(segment: &str) -> Result<Self> {
        let captures = SEGMENT_PATTERN
            .captures(segment)
            .ok_or_else(|| Error::MalformedFilter(segment.to_string()))?;

        let raw_value = captures.get(3).map_or("", |m| m.as_str());
        let value =
            url_decode(raw_value).ok_or_else(|| Error::InvalidEncoding(segment.to_string()))?;

        Ok(Self {
            column: captures[1].to_string(),
            operator: captures[2].to_string(),
            value,
        })
    }

    pub fn is_order(&self) -> bool {
        self.column == ORDER_PARAMETER
    }
}

/// Parse a full query string into a fresh clause for `table`.
///
/// A `(column, operator)` pair outside the whitelist is skipped. An invalid
/// ordering directive aborts the whole parse.
pub fn parse_query_string(table: &'static TableSpec, query_string: &str) -> Result<FilterClause> {
    let mut clause = FilterClause::new();

    info!("Parsing query string: {:?}", query_string);

    for segment in query_string.split('&').filter(|s| !s.is_empty()) {
        debug!("Parsing parameter: {}", segment);

        let parameter = FilterParameter::parse(segment)?;

        if parameter.is_order() {
            let order = resolve_order(table, &parameter)?;
            info!(
                "Added ORDER BY clause: {} {}",
                order.column,
                order.direction.sql()
            );
            clause.set_order(order);
            continue;
        }

        match table.permits(&parameter.column, &parameter.operator) {
            Some((column, operator)) => {
                let value = BoundValue::from_raw(&parameter.value);
                info!(
                    "Added {} {} {} to WHERE clause",
                    column.name,
                    operator.sql(),
                    value
                );
                clause.push(column, operator, value);
            }
            None => {
                debug!(
                    "Ignoring unsupported filter {}.{}",
                    parameter.column, parameter.operator
                );
            }
        }
    }

    Ok(clause)
}

fn resolve_order(table: &'static TableSpec, parameter: &FilterParameter) -> Result<OrderDirective> {
    let column = table.column(&parameter.operator);
    let direction = SortDirection::from_modifier(&parameter.value);

    match (column, direction) {
        (Some(column), Some(direction)) => Ok(OrderDirective {
            column: column.name,
            direction,
        }),
        _ => Err(Error::InvalidOrderDirection),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{FilterOperator, MOVIES};

    #[test]
    fn test_parse_segment() {
        let param = FilterParameter::parse("running_mins=gt.150").unwrap();
        assert_eq!(param.column, "running_mins");
        assert_eq!(param.operator, "gt");
        assert_eq!(param.value, "150");
        assert!(!param.is_order());
    }

    #[test]
    fn test_parse_segment_leading_question_mark() {
        let param = FilterParameter::parse("?id=eq.60").unwrap();
        assert_eq!(param.column, "id");
        assert_eq!(param.value, "60");
    }

    #[test]
    fn test_parse_segment_empty_value() {
        let param = FilterParameter::parse("order=title.").unwrap();
        assert!(param.is_order());
        assert_eq!(param.operator, "title");
        assert_eq!(param.value, "");
    }

    #[test]
    fn test_parse_segment_decodes_value() {
        let param = FilterParameter::parse("title=eq.Am%C3%A9lie").unwrap();
        assert_eq!(param.value, "Amélie");

        let param = FilterParameter::parse("title=eq.Matrix,+The").unwrap();
        assert_eq!(param.value, "Matrix, The");

        let param = FilterParameter::parse("title=eq.a.b.c").unwrap();
        assert_eq!(param.operator, "eq");
        assert_eq!(param.value, "a.b.c");
    }

    #[test]
    fn test_malformed_segment() {
        for segment in ["id", "id=60", "id=EQ.60", "=eq.1", "i-d=eq.1"] {
            assert!(
                matches!(FilterParameter::parse(segment), Err(Error::MalformedFilter(_))),
                "{segment} should be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_encoding() {
        assert!(matches!(
            FilterParameter::parse("title=eq.%FF"),
            Err(Error::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_empty_query_string() {
        let clause = parse_query_string(&MOVIES, "").unwrap();
        assert!(clause.is_empty());
    }

    #[test]
    fn test_filters_and_order() {
        let clause =
            parse_query_string(&MOVIES, "order=running_mins.desc&running_mins=gt.150").unwrap();

        assert_eq!(clause.where_sql(), "WHERE running_mins > ?");
        assert_eq!(clause.order_sql(), "ORDER BY running_mins DESC");
        assert_eq!(clause.predicates()[0].operator, FilterOperator::Gt);
        assert_eq!(clause.predicates()[0].value, BoundValue::Integer(150));
    }

    #[test]
    fn test_multiple_predicates_keep_order() {
        let clause = parse_query_string(
            &MOVIES,
            "running_mins=gte.130&title=neq.Inception&running_mins=lt.170",
        )
        .unwrap();

        assert_eq!(
            clause.where_sql(),
            "WHERE running_mins >= ? AND title != ? AND running_mins < ?"
        );
        let values: Vec<_> = clause.bound_values().cloned().collect();
        assert_eq!(
            values,
            vec![
                BoundValue::Integer(130),
                BoundValue::Text("Inception".into()),
                BoundValue::Integer(170)
            ]
        );
    }

    #[test]
    fn test_unsupported_pairs_are_ignored() {
        let clause = parse_query_string(&MOVIES, "title=gt.A&director=eq.Nolan&id=like.1").unwrap();
        assert!(clause.predicates().is_empty());

        let clause = parse_query_string(&MOVIES, "title=lt.A&id=eq.20").unwrap();
        assert_eq!(clause.where_sql(), "WHERE id = ?");
    }

    #[test]
    fn test_invalid_order_direction() {
        let result = parse_query_string(&MOVIES, "order=running_mins.invalid");
        assert!(matches!(result, Err(Error::InvalidOrderDirection)));

        let result = parse_query_string(&MOVIES, "id=eq.20&order=director.asc");
        assert!(matches!(result, Err(Error::InvalidOrderDirection)));
    }

    #[test]
    fn test_order_defaults_ascending_and_last_wins() {
        let clause = parse_query_string(&MOVIES, "order=title.&order=id.desc").unwrap();
        assert_eq!(clause.order_sql(), "ORDER BY id DESC");

        let clause = parse_query_string(&MOVIES, "order=title.").unwrap();
        assert_eq!(clause.order_sql(), "ORDER BY title ASC");
    }

    #[test]
    fn test_leading_question_mark_is_equivalent() {
        let with = parse_query_string(&MOVIES, "?id=eq.60").unwrap();
        let without = parse_query_string(&MOVIES, "id=eq.60").unwrap();
        assert_eq!(with.where_sql(), without.where_sql());
        assert_eq!(
            with.bound_values().collect::<Vec<_>>(),
            without.bound_values().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_non_numeric_value_parses() {
        // Type errors surface at execution, not here
        let clause = parse_query_string(&MOVIES, "id=eq.string").unwrap();
        assert_eq!(clause.predicates()[0].value, BoundValue::Text("string".into()));
    }

    #[test]
    fn test_empty_segments_skipped() {
        let clause = parse_query_string(&MOVIES, "id=eq.10&&running_mins=gt.100&").unwrap();
        assert_eq!(clause.predicates().len(), 2);
    }
}
