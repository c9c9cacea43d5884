use std::cmp::Ordering;

use serde_json::Value;

use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection};
use crate::database::Document;

/// Tiebreaker on the per-table insertion sequence
const INSERTION_ORDER: &str = "\"seq\" DESC";

pub struct FilterOrder;

impl FilterOrder {
    /// Parse an order string like `"createdAt desc, name asc"`.
    pub fn parse(order: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in order.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            let column = it.next().unwrap_or_default();
            let sort = match it.next() {
                None => SortDirection::Asc,
                Some(dir) if dir.eq_ignore_ascii_case("asc") => SortDirection::Asc,
                Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                Some(dir) => return Err(FilterError::InvalidOrder(format!("unknown direction '{}'", dir))),
            };
            if it.next().is_some() {
                return Err(FilterError::InvalidOrder(format!("unexpected token in '{}'", trimmed)));
            }
            out.push(FilterOrderInfo { column: column.to_string(), sort });
        }
        Ok(out)
    }

    /// ORDER BY clause. Rows equal on every key fall back to newest insertion
    /// first, matching the in-memory store.
    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let mut parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{} {}", Self::sql_column(&i.column), i.sort.to_sql()))
            .collect();
        parts.push(INSERTION_ORDER.to_string());
        format!("ORDER BY {}", parts.join(", "))
    }

    /// Compare two documents according to `infos`, first key first.
    pub fn compare(infos: &[FilterOrderInfo], a: &Document, b: &Document) -> Ordering {
        for info in infos {
            let ordering = match info.column.as_str() {
                "createdAt" => a.created_at.cmp(&b.created_at),
                "updatedAt" => a.updated_at.cmp(&b.updated_at),
                "id" => a.id.cmp(&b.id),
                column => compare_values(a.body.get(column), b.body.get(column)),
            };
            let ordering = info.sort.apply(ordering);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    // System timestamps live in typed columns; everything else is read out of the body
    fn sql_column(column: &str) -> String {
        match column {
            "createdAt" => "\"created_at\"".to_string(),
            "updatedAt" => "\"updated_at\"".to_string(),
            "id" => "\"id\"".to_string(),
            other => format!("\"doc\"->'{}'", other),
        }
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        // Missing values sort first, like NULLS FIRST on ascending order
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
