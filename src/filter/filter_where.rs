use serde_json::{json, Map, Value};

use super::types::FilterWhereInfo;
use crate::database::Document;

/// Renders filter conditions to a parameterised SQL predicate and evaluates
/// the same conditions against in-memory documents.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Build the WHERE body for `conditions`. Placeholders are numbered from
    /// `starting_param_index + 1` so callers can bind their own values first.
    pub fn generate(conditions: &[FilterWhereInfo], starting_param_index: usize) -> (String, Vec<Value>) {
        let mut filter_where = Self::new(starting_param_index);
        let sql_conditions: Vec<String> = conditions
            .iter()
            .map(|condition| filter_where.build_sql_condition(condition))
            .collect();

        let where_clause = if sql_conditions.is_empty() {
            "1=1".to_string()
        } else {
            sql_conditions.join(" AND ")
        };
        (where_clause, filter_where.param_values)
    }

    pub fn matches(conditions: &[FilterWhereInfo], document: &Document) -> bool {
        conditions.iter().all(|condition| Self::matches_condition(condition, document))
    }

    fn matches_condition(condition: &FilterWhereInfo, document: &Document) -> bool {
        match condition {
            FilterWhereInfo::Id(id) => document.id == *id,
            FilterWhereInfo::Owner(owner) => document.owner_id == Some(*owner),
            FilterWhereInfo::Eq { column, data } => document.body.get(column) == Some(data),
            FilterWhereInfo::Search { columns, term } => {
                let needle = term.to_lowercase();
                columns.iter().any(|column| {
                    document
                        .body
                        .get(column)
                        .and_then(Value::as_str)
                        .map(|haystack| haystack.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                })
            }
        }
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        match condition {
            FilterWhereInfo::Id(id) => {
                format!("\"id\" = {}::uuid", self.param(Value::String(id.to_string())))
            }
            FilterWhereInfo::Owner(owner) => {
                format!("\"owner_id\" = {}::uuid", self.param(Value::String(owner.to_string())))
            }
            FilterWhereInfo::Eq { column, data } => {
                // JSONB containment keeps the comparison type-aware (strings, booleans, numbers)
                let mut probe = Map::new();
                probe.insert(column.clone(), data.clone());
                format!("\"doc\" @> {}::jsonb", self.param(Value::Object(probe)))
            }
            FilterWhereInfo::Search { columns, term } => {
                if columns.is_empty() {
                    return "1=0".to_string();
                }
                let placeholder = self.param(json!(format!("%{}%", escape_like(term))));
                let parts: Vec<String> = columns
                    .iter()
                    .map(|column| format!("\"doc\"->>'{}' ILIKE {}", column, placeholder))
                    .collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// Escape LIKE metacharacters so a search term only ever matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn document(owner: Uuid, body: Value) -> Document {
        let now = Utc::now();
        Document { id: Uuid::new_v4(), owner_id: Some(owner), created_at: now, updated_at: now, body }
    }

    #[test]
    fn numbers_placeholders_from_starting_index() {
        let owner = Uuid::new_v4();
        let conditions = vec![
            FilterWhereInfo::Owner(owner),
            FilterWhereInfo::Eq { column: "status".into(), data: json!("ongoing") },
        ];
        let (sql, params) = FilterWhere::generate(&conditions, 2);
        assert_eq!(sql, "\"owner_id\" = $3::uuid AND \"doc\" @> $4::jsonb");
        assert_eq!(params, vec![json!(owner.to_string()), json!({"status": "ongoing"})]);
    }

    #[test]
    fn search_reuses_one_placeholder_across_columns() {
        let conditions = vec![FilterWhereInfo::Search {
            columns: vec!["name".into(), "description".into()],
            term: "50%_off".into(),
        }];
        let (sql, params) = FilterWhere::generate(&conditions, 0);
        assert_eq!(sql, "(\"doc\"->>'name' ILIKE $1 OR \"doc\"->>'description' ILIKE $1)");
        assert_eq!(params, vec![json!("%50\\%\\_off%")]);
    }

    #[test]
    fn empty_conditions_match_everything() {
        let (sql, params) = FilterWhere::generate(&[], 0);
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn in_memory_search_is_case_insensitive_or() {
        let owner = Uuid::new_v4();
        let doc = document(owner, json!({"name": "Red Yarn", "color": null, "notes": "soft"}));
        let search = |term: &str| {
            vec![FilterWhereInfo::Search {
                columns: vec!["name".into(), "color".into(), "notes".into()],
                term: term.into(),
            }]
        };
        assert!(FilterWhere::matches(&search("red"), &doc));
        assert!(FilterWhere::matches(&search("SOFT"), &doc));
        assert!(!FilterWhere::matches(&search("blue"), &doc));
    }

    #[test]
    fn in_memory_owner_and_eq_are_combined_with_and() {
        let owner = Uuid::new_v4();
        let doc = document(owner, json!({"status": "ongoing", "isImportant": true}));
        let conditions = vec![
            FilterWhereInfo::Owner(owner),
            FilterWhereInfo::Eq { column: "isImportant".into(), data: json!(true) },
        ];
        assert!(FilterWhere::matches(&conditions, &doc));

        let other_owner = vec![
            FilterWhereInfo::Owner(Uuid::new_v4()),
            FilterWhereInfo::Eq { column: "isImportant".into(), data: json!(true) },
        ];
        assert!(!FilterWhere::matches(&other_owner, &doc));
    }
}
