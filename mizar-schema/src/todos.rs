use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::validate::{FieldError, Validate, finish};

pub const TITLE_MAX_LEN: usize = 128;

/// Upper bound on one bulk request; larger imports should be chunked by
/// the caller.
pub const BULK_MAX_ITEMS: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoCreate {
    pub title: String,

    /// Accepts a JSON number or a numeric string; several HTTP clients
    /// serialize ids as strings.
    #[serde(deserialize_with = "deserialize_i64_lax")]
    pub owner_id: i64,

    #[serde(default)]
    pub done: bool,
}

impl Validate for TodoCreate {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_todo(self, "", &mut errors);
        finish(errors)
    }
}

/// `None` => do not change; `Some(v)` => update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub done: Option<bool>,
}

impl Validate for TodoPatch {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if let Some(title) = &self.title {
            check_title(title, "title", &mut errors);
        }
        finish(errors)
    }
}

/// Bulk creation payload: a bare JSON array of todo bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoBulkCreate(pub Vec<TodoCreate>);

impl Validate for TodoBulkCreate {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.0.is_empty() {
            errors.push(FieldError::new("items", "must not be empty"));
        }
        if self.0.len() > BULK_MAX_ITEMS {
            errors.push(FieldError::new(
                "items",
                format!("must contain at most {BULK_MAX_ITEMS} items"),
            ));
        }
        for (index, item) in self.0.iter().enumerate() {
            check_todo(item, &format!("items[{index}]."), &mut errors);
        }
        finish(errors)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoOut {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing query parameters for todos; `None` fields do not constrain.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TodoListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub owner_id: Option<i64>,
    pub done: Option<bool>,
}

fn check_todo(todo: &TodoCreate, prefix: &str, errors: &mut Vec<FieldError>) {
    check_title(&todo.title, &format!("{prefix}title"), errors);
    if todo.owner_id < 1 {
        errors.push(FieldError::new(
            format!("{prefix}owner_id"),
            "must be a positive integer",
        ));
    }
}

fn check_title(title: &str, field: &str, errors: &mut Vec<FieldError>) {
    if title.trim().is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
    } else if title.chars().count() > TITLE_MAX_LEN {
        errors.push(FieldError::new(
            field,
            format!("must be at most {TITLE_MAX_LEN} characters"),
        ));
    }
}

fn deserialize_i64_lax<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom("expected an integer id")),
        Value::String(s) => s
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom("expected an integer id")),
        _ => Err(serde::de::Error::custom(
            "expected a number or a numeric string for owner_id",
        )),
    }
}
