//! Typed readers for JSON attribute values used by the per-kind allow-lists.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::errors::ModelError;

/// Keys owned by the identity base; never assignable from input.
pub const PROTECTED: [&str; 4] = ["id", "created_at", "updated_at", crate::kind::CLASS_FIELD];

fn mismatch(key: &str, expected: &str) -> ModelError {
    ModelError::Validation(format!("{key} must be {expected}"))
}

pub fn string(key: &str, value: &Value) -> Result<String, ModelError> {
    value.as_str().map(str::to_string).ok_or_else(|| mismatch(key, "a string"))
}

pub fn opt_string(key: &str, value: &Value) -> Result<Option<String>, ModelError> {
    match value {
        Value::Null => Ok(None),
        other => string(key, other).map(Some),
    }
}

pub fn int(key: &str, value: &Value) -> Result<i32, ModelError> {
    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| mismatch(key, "an integer"))
}

pub fn opt_float(key: &str, value: &Value) -> Result<Option<f64>, ModelError> {
    match value {
        Value::Null => Ok(None),
        other => other.as_f64().map(Some).ok_or_else(|| mismatch(key, "a number")),
    }
}

pub fn string_list(key: &str, value: &Value) -> Result<Vec<String>, ModelError> {
    let items = value.as_array().ok_or_else(|| mismatch(key, "a list of strings"))?;
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let id = string(key, item)?;
        if !out.contains(&id) {
            out.push(id);
        }
    }
    Ok(out)
}

/// Serde counterpart of [`string_list`]: keeps the first occurrence of each id.
pub fn unique_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let ids = Vec::<String>::deserialize(deserializer)?;
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    Ok(out)
}

pub fn non_empty(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::required(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn readers_enforce_json_types() {
        assert_eq!(string("name", &json!("Loft")).ok(), Some("Loft".to_string()));
        assert!(string("name", &json!(3)).is_err());
        assert_eq!(opt_string("description", &Value::Null).ok(), Some(None));
        assert_eq!(int("max_guest", &json!(4)).ok(), Some(4));
        assert!(int("max_guest", &json!(4.5)).is_err());
        assert!(int("max_guest", &json!(i64::MAX)).is_err());
        assert_eq!(opt_float("latitude", &json!(37)).ok(), Some(Some(37.0)));
    }

    #[test]
    fn string_list_drops_duplicates() {
        let ids = string_list("amenity_ids", &json!(["a", "b", "a"])).unwrap();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }
}
