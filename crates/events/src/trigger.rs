//! Alert creation events.

use prana_core::alert::AlertRecord;
use prana_core::error::CoreError;
use prana_core::types::{AlertId, Uid};

/// Marker preceding the document path in fully qualified resource names,
/// e.g. `projects/p/databases/(default)/documents/users/u1/alerts/a1`.
const DOCUMENTS_ROOT: &str = "/documents/";

/// Start of a fully qualified resource name.
const RESOURCE_PREFIX: &str = "projects/";

/// A newly created alert document and the path parameters it was created
/// under.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertTrigger {
    pub uid: Uid,
    pub alert_id: AlertId,
    pub record: AlertRecord,
}

impl AlertTrigger {
    pub fn new(uid: impl Into<Uid>, alert_id: impl Into<AlertId>, record: AlertRecord) -> Self {
        Self {
            uid: uid.into(),
            alert_id: alert_id.into(),
            record,
        }
    }

    /// Build a trigger from a change-feed document path and its field set.
    pub fn from_document(path: &str, value: serde_json::Value) -> Result<Self, CoreError> {
        let (uid, alert_id) = parse_document_path(path)?;
        Ok(Self::new(uid, alert_id, AlertRecord::from_json(value)?))
    }
}

/// Split `users/{uid}/alerts/{alertId}` into its two parameters.
///
/// Accepts an optional leading `/` and, for fully qualified names starting
/// with `projects/`, the prefix up to the first `/documents/`. Anything else,
/// including empty segments or deeper paths, is rejected.
pub fn parse_document_path(path: &str) -> Result<(Uid, AlertId), CoreError> {
    let trimmed = path.trim_start_matches('/');
    let relative = if trimmed.starts_with(RESOURCE_PREFIX) {
        match trimmed.find(DOCUMENTS_ROOT) {
            Some(idx) => &trimmed[idx + DOCUMENTS_ROOT.len()..],
            None => return Err(CoreError::InvalidDocumentPath(path.to_string())),
        }
    } else {
        trimmed
    };

    let segments: Vec<&str> = relative.split('/').collect();
    match segments.as_slice() {
        ["users", uid, "alerts", alert_id] if !uid.is_empty() && !alert_id.is_empty() => {
            Ok((uid.to_string(), alert_id.to_string()))
        }
        _ => Err(CoreError::InvalidDocumentPath(path.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn parses_relative_path() {
        let (uid, alert_id) = parse_document_path("users/u-1/alerts/a-9").unwrap();
        assert_eq!(uid, "u-1");
        assert_eq!(alert_id, "a-9");
    }

    #[test]
    fn parses_leading_slash_and_resource_prefix() {
        assert!(parse_document_path("/users/u/alerts/a").is_ok());

        let (uid, alert_id) = parse_document_path(
            "projects/prana-g/databases/(default)/documents/users/u-2/alerts/a-3",
        )
        .unwrap();
        assert_eq!((uid.as_str(), alert_id.as_str()), ("u-2", "a-3"));
    }

    #[test]
    fn uid_named_documents_is_not_a_resource_prefix() {
        let (uid, alert_id) = parse_document_path("users/documents/alerts/a1").unwrap();
        assert_eq!((uid.as_str(), alert_id.as_str()), ("documents", "a1"));

        let (uid, _) = parse_document_path(
            "projects/p/databases/(default)/documents/users/documents/alerts/a1",
        )
        .unwrap();
        assert_eq!(uid, "documents");
    }

    #[test]
    fn rejects_other_shapes() {
        for path in [
            "",
            "users/u-1",
            "users//alerts/a",
            "users/u/alerts/",
            "users/u/alerts/a/extra",
            "herds/h/alerts/a",
            "projects/p/databases/(default)/users/u/alerts/a",
        ] {
            assert_matches!(
                parse_document_path(path),
                Err(CoreError::InvalidDocumentPath(_)),
                "{path:?} should be rejected"
            );
        }
    }

    #[test]
    fn from_document_parses_path_and_record() {
        let trigger =
            AlertTrigger::from_document("users/u/alerts/a", json!({ "title": "Calving" })).unwrap();
        assert_eq!(trigger.uid, "u");
        assert_eq!(trigger.alert_id, "a");
        assert_eq!(trigger.record.title_text().as_deref(), Some("Calving"));
    }
}
