//! Top-level JSON diff between two entity states
//!
//! Feeds the structured changelog: one [`FieldChange`] per top-level field
//! whose value differs. Numbers compare with a float tolerance since amounts
//! round-trip through `REAL` columns.

use serde::Serialize;
use serde_json::{Map, Value};

const FLOAT_EPSILON: f64 = 1e-9;

/// One changed field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub from: Value,
    pub to: Value,
}

impl FieldChange {
    /// Old value as changelog text (`None` for JSON null)
    pub fn from_text(&self) -> Option<String> {
        value_text(&self.from)
    }

    pub fn to_text(&self) -> Option<String> {
        value_text(&self.to)
    }
}

/// Bookkeeping fields left out of the changelog
const EXCLUDED_FIELDS: &[&str] = &["id", "created_at", "updated_at"];

/// Serialize an entity for the snapshot log
pub fn snapshot<T: Serialize>(value: &T) -> Value {
    match serde_json::to_value(value) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize history snapshot");
            Value::Object(Map::new())
        }
    }
}

/// Fields that differ between `before` and `after`.
///
/// A missing `before` (creation) reports every non-null field of `after`
/// as changed from null. Output is sorted by field name.
pub fn diff_fields(before: Option<&Value>, after: &Value) -> Vec<FieldChange> {
    let empty = Map::new();
    let from_obj = before.and_then(Value::as_object).unwrap_or(&empty);
    let Some(to_obj) = after.as_object() else {
        return Vec::new();
    };

    let mut keys: Vec<&String> = from_obj.keys().chain(to_obj.keys()).collect();
    keys.sort();
    keys.dedup();

    keys.into_iter()
        .filter(|key| !EXCLUDED_FIELDS.contains(&key.as_str()))
        .filter_map(|key| {
            let from = from_obj.get(key).unwrap_or(&Value::Null);
            let to = to_obj.get(key).unwrap_or(&Value::Null);
            (!values_equal(from, to)).then(|| FieldChange {
                field: key.clone(),
                from: from.clone(),
                to: to.clone(),
            })
        })
        .collect()
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(fa), Some(fb)) => (fa - fb).abs() < FLOAT_EPSILON,
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(va, vb)| values_equal(va, vb))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, va)| b.get(key).is_some_and(|vb| values_equal(va, vb)))
        }
        _ => a == b,
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
