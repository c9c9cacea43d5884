use std::cmp::Ordering;

use serde_json::Value;
use uuid::Uuid;

/// A single predicate of a filter. All conditions of a filter are combined
/// with AND; a `Search` is itself an OR across its fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterWhereInfo {
    /// Primary key match on the `id` column
    Id(Uuid),
    /// Ownership match on the `owner_id` column
    Owner(Uuid),
    /// Exact match of a document field
    Eq { column: String, data: Value },
    /// Case-insensitive substring match on any of the listed document fields
    Search { columns: Vec<String>, term: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}
