use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{active_choice, active_search, check_max_len, clean_optional, nullable, FieldErrors, Resource};
use crate::filter::{Filter, FilterError};

pub const NAME_MAX: usize = 100;
pub const NOTES_MAX: usize = 200;
pub const DEFAULT_UNIT: &str = "pieces";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplyCategory {
    Yarn,
    Fabric,
    Thread,
    Needles,
    Tools,
    Patterns,
    Other,
}

impl SupplyCategory {
    pub const ALL: [SupplyCategory; 7] = [
        Self::Yarn,
        Self::Fabric,
        Self::Thread,
        Self::Needles,
        Self::Tools,
        Self::Patterns,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yarn => "yarn",
            Self::Fabric => "fabric",
            Self::Thread => "thread",
            Self::Needles => "needles",
            Self::Tools => "tools",
            Self::Patterns => "patterns",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supply {
    pub id: Uuid,
    pub name: String,
    pub category: SupplyCategory,
    pub quantity: f64,
    pub unit: String,
    pub color: Option<String>,
    pub notes: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub color: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplyQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl Resource for Supply {
    const COLLECTION: &'static str = "supplies";
    const SINGULAR: &'static str = "supply";
    const LABEL: &'static str = "Supply";

    type Input = SupplyInput;
    type Query = SupplyQuery;

    fn new(id: Uuid, owner_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: String::new(),
            category: SupplyCategory::Other,
            quantity: 1.0,
            unit: DEFAULT_UNIT.to_string(),
            color: None,
            notes: None,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: SupplyInput, errors: &mut FieldErrors) {
        if let Some(name) = input.name {
            self.name = name.trim().to_string();
        }
        if let Some(category) = input.category {
            match SupplyCategory::parse(category.trim()) {
                Some(category) => self.category = category,
                None => errors.add(
                    "category",
                    format!(
                        "Category must be one of: yarn, fabric, thread, needles, tools, patterns, other (got '{}')",
                        category
                    ),
                ),
            }
        }
        if let Some(quantity) = input.quantity {
            self.quantity = quantity;
        }
        if let Some(unit) = input.unit {
            self.unit = clean_optional(Some(unit)).unwrap_or_else(|| DEFAULT_UNIT.to_string());
        }
        if let Some(color) = input.color {
            self.color = clean_optional(color);
        }
        if let Some(notes) = input.notes {
            self.notes = clean_optional(notes);
        }
    }

    fn validate(&self, errors: &mut FieldErrors) {
        if self.name.is_empty() {
            errors.add("name", "Supply name is required");
        }
        check_max_len(errors, "name", &self.name, NAME_MAX);
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            errors.add("quantity", "Quantity cannot be negative");
        }
        if let Some(notes) = &self.notes {
            check_max_len(errors, "notes", notes, NOTES_MAX);
        }
    }

    fn list_filter(owner_id: Uuid, query: &SupplyQuery) -> Result<Filter, FilterError> {
        let mut filter = Filter::new(Self::COLLECTION)?.owner(owner_id);
        if let Some(category) = active_choice(query.category.as_deref()) {
            filter = filter.eq("category", category)?;
        }
        if let Some(term) = active_search(query.search.as_deref()) {
            filter = filter.search(&["name", "color", "notes"], term)?;
        }
        filter.order("createdAt desc")
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(body: serde_json::Value) -> (Supply, FieldErrors) {
        let input: SupplyInput = serde_json::from_value(body).unwrap();
        let mut supply = Supply::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
        let mut errors = FieldErrors::new();
        supply.apply(input, &mut errors);
        supply.validate(&mut errors);
        (supply, errors)
    }

    #[test]
    fn applies_defaults() {
        let (supply, errors) = build(json!({"name": "Knitting Needles"}));
        assert!(errors.is_empty());
        assert_eq!(supply.category, SupplyCategory::Other);
        assert_eq!(supply.quantity, 1.0);
        assert_eq!(supply.unit, "pieces");
        assert_eq!(supply.color, None);
    }

    #[test]
    fn rejects_negative_quantity() {
        let (_, errors) = build(json!({"name": "Red Yarn", "quantity": -1}));
        assert_eq!(errors.get("quantity"), Some("Quantity cannot be negative"));

        let (supply, errors) = build(json!({"name": "Red Yarn", "quantity": 0}));
        assert!(errors.is_empty());
        assert_eq!(supply.quantity, 0.0);
    }

    #[test]
    fn rejects_unknown_category_and_long_notes() {
        let (_, errors) = build(json!({"name": "Glue", "category": "adhesives", "notes": "n".repeat(201)}));
        assert!(errors.get("category").is_some());
        assert!(errors.get("notes").is_some());
    }

    #[test]
    fn blank_unit_falls_back_to_default() {
        let (supply, _) = build(json!({"name": "Buttons", "unit": "  ", "color": " blue "}));
        assert_eq!(supply.unit, "pieces");
        assert_eq!(supply.color.as_deref(), Some("blue"));
    }

    #[test]
    fn list_filter_searches_name_color_and_notes() {
        let query = SupplyQuery { category: Some("yarn".into()), search: Some("red".into()) };
        let sql = Supply::list_filter(Uuid::new_v4(), &query).unwrap().to_sql();
        assert!(sql.query.contains("\"doc\"->>'color' ILIKE"));
        assert!(sql.query.ends_with("ORDER BY \"created_at\" DESC, \"seq\" DESC"));
    }
}
