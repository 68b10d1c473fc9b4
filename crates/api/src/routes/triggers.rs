//! Alert-created trigger endpoints.
//!
//! The event source calls one of these once per new alert document. A `204`
//! means the event was handled (including "nothing to send"); any `5xx` asks
//! the source to redeliver.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use prana_core::alert::AlertRecord;
use prana_events::AlertTrigger;
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Header carrying the shared trigger secret.
pub const TRIGGER_SECRET_HEADER: &str = "x-trigger-secret";

/// A document-creation change as delivered by a change feed.
#[derive(Debug, Deserialize)]
pub struct DocumentChange {
    /// `users/{uid}/alerts/{alertId}`, optionally fully qualified.
    pub document: String,
    /// The created document's fields.
    #[serde(default)]
    pub value: serde_json::Value,
}

/// POST /triggers/users/{uid}/alerts/{alert_id}
///
/// The body is the created alert record. An empty body is an empty record.
async fn alert_created(
    State(state): State<AppState>,
    Path((uid, alert_id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<StatusCode> {
    authorize(&state.config, &headers)?;

    let value = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid alert JSON: {e}")))?
    };

    let trigger = AlertTrigger::new(uid, alert_id, AlertRecord::from_json(value)?);
    notify(&state, trigger).await
}

/// POST /triggers/alert-created
async fn document_created(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<StatusCode> {
    authorize(&state.config, &headers)?;

    let change: DocumentChange = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid document change: {e}")))?;

    let trigger = AlertTrigger::from_document(&change.document, change.value)?;
    notify(&state, trigger).await
}

async fn notify(state: &AppState, trigger: AlertTrigger) -> AppResult<StatusCode> {
    let outcome = state.notifier.handle(&trigger).await?;
    tracing::debug!(
        uid = %trigger.uid,
        alert_id = %trigger.alert_id,
        ?outcome,
        "Trigger handled"
    );
    Ok(StatusCode::NO_CONTENT)
}

fn authorize(config: &ServerConfig, headers: &HeaderMap) -> AppResult<()> {
    let Some(expected) = config.trigger_secret.as_deref() else {
        return Ok(());
    };

    let presented = headers
        .get(TRIGGER_SECRET_HEADER)
        .map(|v| v.as_bytes())
        .unwrap_or_default();
    if secrets_match(expected.as_bytes(), presented) {
        Ok(())
    } else {
        Err(AppError::Unauthorized(format!(
            "Missing or wrong {TRIGGER_SECRET_HEADER} header"
        )))
    }
}

/// Constant-time comparison; only the lengths can leak.
fn secrets_match(expected: &[u8], presented: &[u8]) -> bool {
    expected.ct_eq(presented).into()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/triggers/users/{uid}/alerts/{alert_id}",
            post(alert_created),
        )
        .route("/triggers/alert-created", post(document_created))
}
