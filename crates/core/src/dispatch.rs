//! Multicast dispatch requests and per-token outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::payload::NotificationPayload;

/// Delivery priority hint passed to the push provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    #[default]
    High,
}

/// One push addressed to several device tokens at once.
#[derive(Debug, Clone, PartialEq)]
pub struct MulticastMessage {
    pub tokens: Vec<String>,
    pub payload: NotificationPayload,
    pub priority: Priority,
}

/// Provider error classification, using the `messaging/*` code vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessagingErrorCode {
    InvalidRegistrationToken,
    RegistrationTokenNotRegistered,
    InvalidArgument,
    MismatchedCredential,
    MessageRateExceeded,
    ServerUnavailable,
    InternalError,
    ThirdPartyAuthError,
    UnknownError,
    /// A code this crate has no variant for, kept verbatim.
    Other(String),
}

impl MessagingErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidRegistrationToken => "messaging/invalid-registration-token",
            Self::RegistrationTokenNotRegistered => "messaging/registration-token-not-registered",
            Self::InvalidArgument => "messaging/invalid-argument",
            Self::MismatchedCredential => "messaging/mismatched-credential",
            Self::MessageRateExceeded => "messaging/message-rate-exceeded",
            Self::ServerUnavailable => "messaging/server-unavailable",
            Self::InternalError => "messaging/internal-error",
            Self::ThirdPartyAuthError => "messaging/third-party-auth-error",
            Self::UnknownError => "messaging/unknown-error",
            Self::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "messaging/invalid-registration-token" => Self::InvalidRegistrationToken,
            "messaging/registration-token-not-registered" => Self::RegistrationTokenNotRegistered,
            "messaging/invalid-argument" => Self::InvalidArgument,
            "messaging/mismatched-credential" => Self::MismatchedCredential,
            "messaging/message-rate-exceeded" => Self::MessageRateExceeded,
            "messaging/server-unavailable" => Self::ServerUnavailable,
            "messaging/internal-error" => Self::InternalError,
            "messaging/third-party-auth-error" => Self::ThirdPartyAuthError,
            "messaging/unknown-error" => Self::UnknownError,
            other => Self::Other(other.to_string()),
        }
    }

    /// The token is malformed or no longer registered and will never succeed.
    ///
    /// Only these two codes prune a registration. Every other code, including
    /// ones that look permanent, leaves the token in place.
    pub fn is_permanent_invalidity(&self) -> bool {
        matches!(
            self,
            Self::InvalidRegistrationToken | Self::RegistrationTokenNotRegistered
        )
    }
}

impl fmt::Display for MessagingErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendFailure {
    pub code: MessagingErrorCode,
    pub message: String,
}

/// Result of the send to one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered { message_id: String },
    Failed(SendFailure),
}

impl SendOutcome {
    pub fn failed(code: MessagingErrorCode, message: impl Into<String>) -> Self {
        Self::Failed(SendFailure {
            code,
            message: message.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    pub fn failure(&self) -> Option<&SendFailure> {
        match self {
            Self::Delivered { .. } => None,
            Self::Failed(failure) => Some(failure),
        }
    }
}

/// Outcomes of a [`MulticastMessage`], one per token in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MulticastResponse {
    pub responses: Vec<SendOutcome>,
}

impl MulticastResponse {
    pub fn success_count(&self) -> usize {
        self.responses.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.responses.len() - self.success_count()
    }

    /// Pair each outcome with the token it was sent to.
    pub fn paired<'a>(
        &'a self,
        tokens: &'a [String],
    ) -> impl Iterator<Item = (&'a str, &'a SendOutcome)> + 'a {
        tokens.iter().map(String::as_str).zip(self.responses.iter())
    }

    /// Tokens the provider reported as permanently invalid.
    pub fn invalid_tokens(&self, tokens: &[String]) -> Vec<String> {
        self.paired(tokens)
            .filter(|(_, outcome)| {
                outcome
                    .failure()
                    .is_some_and(|f| f.code.is_permanent_invalidity())
            })
            .map(|(token, _)| token.to_string())
            .collect()
    }
}
