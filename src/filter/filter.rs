use serde_json::Value;
use uuid::Uuid;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOrderInfo, FilterWhereInfo, SqlResult};
use crate::database::Document;

/// Store-agnostic query description: which collection, which documents and
/// in what order. Renders to SQL for Postgres and evaluates in memory for
/// the process-local store.
#[derive(Debug, Clone)]
pub struct Filter {
    table_name: String,
    conditions: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        if !is_identifier(&table_name) {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", table_name)));
        }
        Ok(Self {
            table_name,
            conditions: vec![],
            order_data: vec![],
            limit: None,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn conditions(&self) -> &[FilterWhereInfo] {
        &self.conditions
    }

    pub fn order_info(&self) -> &[FilterOrderInfo] {
        &self.order_data
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.conditions.push(FilterWhereInfo::Id(id));
        self
    }

    pub fn owner(mut self, owner_id: Uuid) -> Self {
        self.conditions.push(FilterWhereInfo::Owner(owner_id));
        self
    }

    /// Scope to one record of one owner. Both must match for the record to
    /// be visible, so another owner's record is indistinguishable from a
    /// missing one.
    pub fn owned_record(table_name: impl Into<String>, owner_id: Uuid, id: Uuid) -> Result<Self, FilterError> {
        Ok(Self::new(table_name)?.id(id).owner(owner_id))
    }

    pub fn eq(mut self, column: &str, data: impl Into<Value>) -> Result<Self, FilterError> {
        validate_column(column)?;
        self.conditions.push(FilterWhereInfo::Eq { column: column.to_string(), data: data.into() });
        Ok(self)
    }

    pub fn search(mut self, columns: &[&str], term: &str) -> Result<Self, FilterError> {
        if columns.is_empty() {
            return Err(FilterError::InvalidSearch("search requires at least one column".to_string()));
        }
        for column in columns {
            validate_column(column)?;
        }
        self.conditions.push(FilterWhereInfo::Search {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            term: term.to_string(),
        });
        Ok(self)
    }

    pub fn order(mut self, order_spec: &str) -> Result<Self, FilterError> {
        let order_info = FilterOrder::parse(order_spec)?;
        for info in &order_info {
            validate_column(&info.column)?;
        }
        self.order_data = order_info;
        Ok(self)
    }

    pub fn limit(mut self, limit: i64) -> Result<Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        self.limit = Some(limit);
        Ok(self)
    }

    /// Full SELECT returning the document body.
    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0);
        let order_clause = FilterOrder::generate(&self.order_data);
        let limit_clause = self.limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default();

        let query = [
            "SELECT \"doc\"".to_string(),
            format!("FROM \"{}\"", self.table_name),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    /// WHERE body only, with placeholders numbered after `starting_param_index`.
    pub fn to_where_sql(&self, starting_param_index: usize) -> SqlResult {
        let (query, params) = FilterWhere::generate(&self.conditions, starting_param_index);
        SqlResult { query, params }
    }

    pub fn to_delete_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0);
        SqlResult {
            query: format!("DELETE FROM \"{}\" WHERE {} RETURNING \"doc\"", self.table_name, where_clause),
            params,
        }
    }

    pub fn matches(&self, document: &Document) -> bool {
        FilterWhere::matches(&self.conditions, document)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_column(column: &str) -> Result<(), FilterError> {
    if !is_identifier(column) {
        return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_injected_table_and_column_names() {
        assert!(matches!(Filter::new("projects; DROP TABLE users"), Err(FilterError::InvalidTableName(_))));
        assert!(matches!(Filter::new(""), Err(FilterError::InvalidTableName(_))));

        let filter = Filter::new("projects").unwrap();
        assert!(matches!(filter.clone().eq("name'--", "x"), Err(FilterError::InvalidColumn(_))));
        assert!(matches!(filter.clone().search(&[], "x"), Err(FilterError::InvalidSearch(_))));
        assert!(matches!(filter.order("doc->>x desc"), Err(FilterError::InvalidColumn(_))));
    }

    #[test]
    fn builds_scoped_list_query() {
        let owner = Uuid::new_v4();
        let sql = Filter::new("projects")
            .unwrap()
            .owner(owner)
            .eq("status", "ongoing")
            .unwrap()
            .search(&["name", "description"], "blanket")
            .unwrap()
            .order("createdAt desc")
            .unwrap()
            .to_sql();

        assert_eq!(
            sql.query,
            "SELECT \"doc\" FROM \"projects\" WHERE \"owner_id\" = $1::uuid AND \"doc\" @> $2::jsonb \
             AND (\"doc\"->>'name' ILIKE $3 OR \"doc\"->>'description' ILIKE $3) ORDER BY \"created_at\" DESC, \"seq\" DESC"
        );
        assert_eq!(
            sql.params,
            vec![json!(owner.to_string()), json!({"status": "ongoing"}), json!("%blanket%")]
        );
    }

    #[test]
    fn owned_record_delete_requires_both_keys() {
        let owner = Uuid::new_v4();
        let id = Uuid::new_v4();
        let sql = Filter::owned_record("supplies", owner, id).unwrap().to_delete_sql();
        assert_eq!(
            sql.query,
            "DELETE FROM \"supplies\" WHERE \"id\" = $1::uuid AND \"owner_id\" = $2::uuid RETURNING \"doc\""
        );
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn limit_must_be_non_negative() {
        let filter = Filter::new("users").unwrap();
        assert!(filter.clone().limit(-1).is_err());
        assert!(filter.limit(1).unwrap().to_sql().query.ends_with("LIMIT 1"));
    }
}
