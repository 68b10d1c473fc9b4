//! The alert-created handler.
//!
//! [`AlertNotifier::handle`] runs once per new alert document:
//!
//! 1. stop if the alert is soft-deleted;
//! 2. load the owner's device-token map and keep the enabled tokens;
//! 3. build the notification payload;
//! 4. send one high-priority multicast;
//! 5. delete the tokens the provider reported as permanently invalid.
//!
//! Every step runs in order within one task. Collaborator failures are
//! returned to the caller untouched; retrying is the trigger host's job.

use std::sync::Arc;

use prana_core::dispatch::{MulticastMessage, Priority};
use prana_core::payload::{NotificationPayload, PayloadDefaults};

use crate::delivery::{DispatchError, PushDispatcher};
use crate::store::{StoreError, UserStore};
use crate::trigger::AlertTrigger;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Failed to load devices for user {uid}: {source}")]
    LoadDevices {
        uid: String,
        #[source]
        source: StoreError,
    },

    #[error("Push dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// The dispatcher broke its contract of one outcome per token.
    #[error("Dispatcher returned {actual} outcomes for {expected} tokens")]
    OutcomeCountMismatch { expected: usize, actual: usize },

    #[error("Failed to prune device tokens for user {uid}: {source}")]
    PruneTokens {
        uid: String,
        #[source]
        source: StoreError,
    },
}

// ---------------------------------------------------------------------------
// NotifyOutcome
// ---------------------------------------------------------------------------

/// What one invocation did. The trigger host does not forward this anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The alert carried `deleted: true`; nothing was read or sent.
    SkippedDeleted,
    /// The user has no enabled device tokens (or no user document).
    NoDevices,
    Dispatched {
        success_count: usize,
        failure_count: usize,
        /// Tokens removed from the user's map, in dispatch order.
        pruned: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// AlertNotifier
// ---------------------------------------------------------------------------

/// Sends a push for each new alert and prunes dead registrations.
///
/// Holds shared handles to its collaborators; build it once at startup and
/// share it (it is cheap to clone).
#[derive(Clone)]
pub struct AlertNotifier {
    store: Arc<dyn UserStore>,
    dispatcher: Arc<dyn PushDispatcher>,
    defaults: PayloadDefaults,
}

impl AlertNotifier {
    pub fn new(store: Arc<dyn UserStore>, dispatcher: Arc<dyn PushDispatcher>) -> Self {
        Self {
            store,
            dispatcher,
            defaults: PayloadDefaults::default(),
        }
    }

    /// Override the title/body used for alerts without their own.
    pub fn with_defaults(mut self, defaults: PayloadDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Handle one alert-created event.
    pub async fn handle(&self, trigger: &AlertTrigger) -> Result<NotifyOutcome, NotifyError> {
        let uid = trigger.uid.as_str();
        let alert_id = trigger.alert_id.as_str();

        if trigger.record.is_deleted() {
            tracing::debug!(uid, alert_id, "Alert is marked deleted, skipping");
            return Ok(NotifyOutcome::SkippedDeleted);
        }

        let tokens = self
            .store
            .device_tokens(uid)
            .await
            .map_err(|source| NotifyError::LoadDevices {
                uid: uid.to_string(),
                source,
            })?
            .map(|map| map.active_tokens())
            .unwrap_or_default();

        if tokens.is_empty() {
            tracing::debug!(uid, alert_id, "No enabled devices, nothing to send");
            return Ok(NotifyOutcome::NoDevices);
        }

        let message = MulticastMessage {
            tokens,
            payload: NotificationPayload::for_alert(alert_id, &trigger.record, &self.defaults),
            priority: Priority::High,
        };

        let response = self.dispatcher.send_multicast(&message).await?;
        if response.responses.len() != message.tokens.len() {
            return Err(NotifyError::OutcomeCountMismatch {
                expected: message.tokens.len(),
                actual: response.responses.len(),
            });
        }

        for (token, outcome) in response.paired(&message.tokens) {
            if let Some(failure) = outcome.failure() {
                if !failure.code.is_permanent_invalidity() {
                    tracing::warn!(
                        uid,
                        alert_id,
                        token,
                        code = %failure.code,
                        detail = %failure.message,
                        "Push failed for device, keeping registration"
                    );
                }
            }
        }

        let pruned = response.invalid_tokens(&message.tokens);
        if !pruned.is_empty() {
            self.store
                .remove_device_tokens(uid, &pruned)
                .await
                .map_err(|source| NotifyError::PruneTokens {
                    uid: uid.to_string(),
                    source,
                })?;
            tracing::info!(uid, pruned = pruned.len(), "Removed invalid device tokens");
        }

        let outcome = NotifyOutcome::Dispatched {
            success_count: response.success_count(),
            failure_count: response.failure_count(),
            pruned,
        };
        tracing::info!(
            uid,
            alert_id,
            token_count = message.tokens.len(),
            ?outcome,
            "Alert notification dispatched"
        );
        Ok(outcome)
    }
}
