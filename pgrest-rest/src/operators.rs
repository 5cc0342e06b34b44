//! Operator table and per-column whitelists
//!
//! Every column that may appear in a filter or ordering directive is listed
//! here together with its storage type and the protocol operators it accepts.
//! Column names reaching SQL text always come from this table, never from the
//! request.

/// Filter operators accepted by the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,  // equals
    Neq, // not equals
    Lt,  // less than
    Gt,  // greater than
    Lte, // less than or equal
    Gte, // greater than or equal
}

impl FilterOperator {
    /// Look up a protocol token such as `gte`
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "eq" => Some(Self::Eq),
            "neq" => Some(Self::Neq),
            "lt" => Some(Self::Lt),
            "gt" => Some(Self::Gt),
            "lte" => Some(Self::Lte),
            "gte" => Some(Self::Gte),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Lt => "lt",
            Self::Gt => "gt",
            Self::Lte => "lte",
            Self::Gte => "gte",
        }
    }

    /// SQL comparison operator
    pub fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Lte => "<=",
            Self::Gte => ">=",
        }
    }
}

/// Storage type of a column, used when binding filter values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
}

/// A filterable, sortable column
#[derive(Debug)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub operators: &'static [FilterOperator],
}

impl ColumnSpec {
    pub fn accepts(&self, operator: FilterOperator) -> bool {
        self.operators.contains(&operator)
    }
}

/// A table exposed as a resource
#[derive(Debug)]
pub struct TableSpec {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [ColumnSpec],
}

impl TableSpec {
    pub fn column(&'static self, name: &str) -> Option<&'static ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Resolve a `(column, operator)` pair against the whitelist.
    ///
    /// Returns `None` for an unknown column, an unknown operator token, or an
    /// operator the column does not accept.
    pub fn permits(
        &'static self,
        column: &str,
        token: &str,
    ) -> Option<(&'static ColumnSpec, FilterOperator)> {
        let spec = self.column(column)?;
        let operator = FilterOperator::from_token(token)?;
        spec.accepts(operator).then_some((spec, operator))
    }
}

pub const EQUALITY_OPERATORS: &[FilterOperator] = &[FilterOperator::Eq, FilterOperator::Neq];

pub const COMPARISON_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Eq,
    FilterOperator::Neq,
    FilterOperator::Lt,
    FilterOperator::Gt,
    FilterOperator::Lte,
    FilterOperator::Gte,
];

/// The `movies` resource
pub static MOVIES: TableSpec = TableSpec {
    name: "movies",
    primary_key: "id",
    columns: &[
        ColumnSpec {
            name: "id",
            column_type: ColumnType::Integer,
            operators: EQUALITY_OPERATORS,
        },
        ColumnSpec {
            name: "title",
            column_type: ColumnType::Text,
            operators: EQUALITY_OPERATORS,
        },
        ColumnSpec {
            name: "running_mins",
            column_type: ColumnType::Integer,
            operators: COMPARISON_OPERATORS,
        },
    ],
};
