pub mod project;
pub mod supply;
pub mod user;

pub use project::{Project, ProjectInput, ProjectQuery, ProjectStatus, Task, TaskInput};
pub use supply::{Supply, SupplyCategory, SupplyInput, SupplyQuery};
pub use user::{User, UserProfile};

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::database::store::Document;
use crate::filter::{Filter, FilterError};

/// An owner-scoped entity stored as a document in `COLLECTION`.
///
/// Creation starts from `new` (the defaults), applies the caller's input and
/// then validates the result. Updates load the stored record and run the
/// same `apply` + `validate` pass over it, so partial bodies merge into the
/// existing values.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection (table) name
    const COLLECTION: &'static str;
    /// Key wrapping a single record in responses, e.g. `{ "project": ... }`
    const SINGULAR: &'static str;
    /// Human label used in messages
    const LABEL: &'static str;

    type Input: DeserializeOwned + Send + 'static;
    type Query: DeserializeOwned + Send + 'static;

    fn new(id: Uuid, owner_id: Uuid, now: DateTime<Utc>) -> Self;

    /// Copy the fields present in `input` onto the record. Values that cannot
    /// be represented (unknown enum members) are reported in `errors`.
    fn apply(&mut self, input: Self::Input, errors: &mut FieldErrors);

    fn validate(&self, errors: &mut FieldErrors);

    /// Filter for the owner's list endpoint, newest first
    fn list_filter(owner_id: Uuid, query: &Self::Query) -> Result<Filter, FilterError>;

    fn id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
    fn set_updated_at(&mut self, now: DateTime<Utc>);

    fn to_document(&self) -> Result<Document, serde_json::Error> {
        Ok(Document {
            id: self.id(),
            owner_id: Some(self.owner_id()),
            created_at: self.created_at(),
            updated_at: self.updated_at(),
            body: serde_json::to_value(self)?,
        })
    }
}

/// Validation failures keyed by field name. The first message recorded for
/// a field wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Distinguish an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Use with `#[serde(default, deserialize_with = "nullable")]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Date accepted from clients either as `YYYY-MM-DD` (midnight UTC) or as a
/// full RFC 3339 timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputDate(pub DateTime<Utc>);

impl<'de> Deserialize<'de> for InputDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(InputDate(ts.with_timezone(&Utc)));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| InputDate(dt.and_utc()))
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw)))
    }
}

/// Trim a free-text field, mapping blank input to `None`
pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Record an error when `value` is longer than `max` characters
pub(crate) fn check_max_len(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(field, format!("{} cannot be more than {} characters", display_name(field), max));
    }
}

fn display_name(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `None` when a list query parameter is absent, blank or the `all` sentinel
pub(crate) fn active_choice(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

pub(crate) fn active_search(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
