//! Push delivery channels.
//!
//! [`PushDispatcher`] is the seam the notifier sends through. The production
//! implementation is [`fcm::FcmDispatcher`], which authenticates with an
//! access token from [`token`].

pub mod fcm;
pub mod token;

use async_trait::async_trait;
use prana_core::dispatch::{MulticastMessage, MulticastResponse};

use self::token::TokenSourceError;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// A failure of the dispatch call as a whole.
///
/// Per-token failures are not errors; they are reported inside the
/// [`MulticastResponse`].
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The underlying HTTP client could not be built or a request could not
    /// be sent at all.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// No access token could be obtained.
    #[error("Access token unavailable: {0}")]
    Token(#[from] TokenSourceError),

    /// The channel is missing settings it cannot run without.
    #[error("Push configuration error: {0}")]
    Config(String),

    /// The provider rejected our credentials rather than a device token.
    #[error("Push provider rejected credentials (HTTP {0})")]
    Unauthorized(u16),
}

// ---------------------------------------------------------------------------
// PushDispatcher
// ---------------------------------------------------------------------------

/// Sends one message to many device tokens.
#[async_trait]
pub trait PushDispatcher: Send + Sync {
    /// Deliver `message` to every token in `message.tokens`.
    ///
    /// Implementations must return exactly one outcome per token, in the
    /// same order as `message.tokens`.
    async fn send_multicast(
        &self,
        message: &MulticastMessage,
    ) -> Result<MulticastResponse, DispatchError>;
}
