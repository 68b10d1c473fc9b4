//! Alert documents (`users/{uid}/alerts/{alertId}`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::value::optional_text;

/// The field set of a newly created alert document.
///
/// Every field is optional and kept as a raw JSON value: the document is
/// written by clients outside this system and is read here exactly as
/// stored. Use the accessor methods to get the interpreted form. Fields not
/// listed here are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,

    /// Alert category, e.g. `"health"` or `"geofence"`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub alert_type: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cattle_id: Option<Value>,

    /// Soft-delete marker set by restore and migration flows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<Value>,
}

impl AlertRecord {
    /// Parse a document body. A JSON `null` body is an empty record.
    pub fn from_json(value: Value) -> Result<Self, CoreError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        // Derived struct deserializers also accept arrays, read positionally.
        if !value.is_object() {
            return Err(CoreError::Validation(format!(
                "Alert record must be a JSON object, got {}",
                json_kind(&value)
            )));
        }
        serde_json::from_value(value).map_err(|e| CoreError::Validation(e.to_string()))
    }

    /// Only a literal boolean `true` marks the alert as deleted.
    pub fn is_deleted(&self) -> bool {
        matches!(self.deleted, Some(Value::Bool(true)))
    }

    pub fn title_text(&self) -> Option<String> {
        optional_text(self.title.as_ref())
    }

    pub fn description_text(&self) -> Option<String> {
        optional_text(self.description.as_ref())
    }

    pub fn alert_type_text(&self) -> Option<String> {
        optional_text(self.alert_type.as_ref())
    }

    pub fn cattle_id_text(&self) -> Option<String> {
        optional_text(self.cattle_id.as_ref())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
