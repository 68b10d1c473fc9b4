//! Loose interpretation of document field values.
//!
//! Alert and user documents are written by mobile clients, so a field that is
//! "supposed" to be a string or a boolean is sometimes stored as a number, an
//! empty string, or `null`. The helpers here give those values one consistent
//! reading: falsy values (`null`, `false`, `0`, `""`) count as absent.

use serde_json::Value;

/// Whether a document value counts as set.
///
/// `null`, `false`, numeric zero, and the empty string are falsy. Everything
/// else, including empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a truthy value as text, or `None` when the value is falsy.
///
/// Integral floats render without a fractional part (`42.0` becomes `"42"`),
/// so identifiers stored as doubles by some clients still match their
/// string form. Arrays render as their comma-joined elements (`null`
/// elements as empty text) and objects as `[object Object]`, the text
/// older clients already expect for those shapes.
pub fn truthy_text(value: &Value) -> Option<String> {
    is_truthy(value).then(|| display_text(value))
}

fn display_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_text(n: &serde_json::Number) -> String {
    match (n.as_i64(), n.as_u64(), n.as_f64()) {
        (Some(i), _, _) => i.to_string(),
        (None, Some(u), _) => u.to_string(),
        (None, None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

/// [`truthy_text`] for an optional field, treating a missing field as falsy.
pub fn optional_text(value: Option<&Value>) -> Option<String> {
    value.and_then(truthy_text)
}
