//! Ingress normalization
//!
//! Two producer versions of the analysis backend coexist and spell the action
//! fields differently. Everything is folded into one canonical [`Action`] here,
//! so no handler downstream ever looks at a synonym key.

use action_primitives::{Action, ActionError, ActionKind};
use serde_json::{Map, Value};

use crate::errors::FlowError;

/// Keys carrying the action type, in lookup order.
pub const TYPE_KEYS: [&str; 3] = ["type", "action_type", "actionType"];

/// Keys carrying the anchor selector, in lookup order.
pub const SELECTOR_KEYS: [&str; 4] = ["selector", "cssSelector", "target", "field_selector"];

/// Keys carrying the value, in lookup order.
pub const VALUE_KEYS: [&str; 3] = ["value", "answer", "text"];

/// Parses a raw payload into its list of entries.
pub fn parse_action_list(payload: &str) -> Result<Vec<Value>, FlowError> {
    let value: Value = serde_json::from_str(payload)?;
    split_entries(value)
}

/// Accepts a bare array or an object with an `actions` array.
pub fn split_entries(payload: Value) -> Result<Vec<Value>, FlowError> {
    match payload {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut map) => match map.remove("actions") {
            Some(Value::Array(entries)) => Ok(entries),
            Some(other) => Err(FlowError::InvalidShape(format!(
                "`actions` of type {}",
                json_type(&other)
            ))),
            None => Err(FlowError::InvalidShape("an object without `actions`".into())),
        },
        other => Err(FlowError::InvalidShape(json_type(&other).to_string())),
    }
}

/// Matches a type string case-insensitively, ignoring `_` and `-`.
pub fn parse_kind(raw: &str) -> Option<ActionKind> {
    let folded: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    ActionKind::ALL
        .into_iter()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(&folded))
}

/// Converts one wire entry into a canonical action.
///
/// A missing or unknown type, or a missing or blank selector, is a structural
/// error. A missing value is not: the executor records it as a skip.
pub fn normalize_action(entry: &Value) -> Result<Action, ActionError> {
    let Value::Object(fields) = entry else {
        return Err(ActionError::Malformed(format!(
            "entry is {}, not an object",
            json_type(entry)
        )));
    };

    let kind = match first_present(fields, &TYPE_KEYS) {
        Some(Value::String(raw)) => parse_kind(raw)
            .ok_or_else(|| ActionError::Malformed(format!("unknown action type `{}`", raw)))?,
        Some(other) => {
            return Err(ActionError::Malformed(format!(
                "action type is {}, not a string",
                json_type(other)
            )))
        }
        None => return Err(ActionError::Malformed("action has no type".into())),
    };

    let selector = match first_present(fields, &SELECTOR_KEYS) {
        Some(Value::String(raw)) if !raw.trim().is_empty() => raw.trim().to_string(),
        Some(Value::String(_)) | None => {
            return Err(ActionError::Malformed(format!(
                "{} action has no selector",
                kind
            )))
        }
        Some(other) => {
            return Err(ActionError::Malformed(format!(
                "selector is {}, not a string",
                json_type(other)
            )))
        }
    };

    let value = first_present(fields, &VALUE_KEYS)
        .map(canonical_value)
        .transpose()?;

    Ok(Action::new(kind, selector, value))
}

/// First key whose value is present and not `null`.
fn first_present<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| !value.is_null())
}

fn canonical_value(value: &Value) -> Result<String, ActionError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Ok(u.to_string())
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => Ok(format!("{}", f as i64)),
                    _ => Ok(n.to_string()),
                }
            }
        }
        other => Err(ActionError::Malformed(format!(
            "value is {}, expected a string, boolean or number",
            json_type(other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
