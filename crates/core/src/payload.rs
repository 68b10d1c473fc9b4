//! Push notification payloads built from alert documents.

use serde::{Deserialize, Serialize};

use crate::alert::AlertRecord;

/// Title shown when the alert has none.
pub const DEFAULT_TITLE: &str = "PRANA-G Alert";

/// Body shown when the alert has no description.
pub const DEFAULT_BODY: &str = "New alert received.";

/// Fallback strings for alerts without a title or description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDefaults {
    pub title: String,
    pub body: String,
}

impl Default for PayloadDefaults {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            body: DEFAULT_BODY.to_string(),
        }
    }
}

/// User-visible part of a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Machine-readable data bundle delivered alongside the notification.
///
/// Every value is text; push providers reject non-string data values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    pub alert_id: String,
    pub cattle_id: String,
    #[serde(rename = "type")]
    pub alert_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub notification: Notification,
    pub data: NotificationData,
}

impl NotificationPayload {
    /// Build the payload for `alert`, stored under `alert_id`.
    pub fn for_alert(alert_id: &str, alert: &AlertRecord, defaults: &PayloadDefaults) -> Self {
        Self {
            notification: Notification {
                title: alert.title_text().unwrap_or_else(|| defaults.title.clone()),
                body: alert
                    .description_text()
                    .unwrap_or_else(|| defaults.body.clone()),
            },
            data: NotificationData {
                alert_id: alert_id.to_string(),
                cattle_id: alert.cattle_id_text().unwrap_or_default(),
                alert_type: alert.alert_type_text().unwrap_or_default(),
            },
        }
    }
}
