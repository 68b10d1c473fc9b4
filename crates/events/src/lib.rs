//! Alert push notification pipeline.
//!
//! This crate holds the handler that runs when an alert document is created
//! and the collaborators it talks to:
//!
//! - [`AlertNotifier`]: resolves the owner's devices, sends the push, and
//!   prunes registrations the provider rejected.
//! - [`UserStore`]: document-store seam, with [`PgUserStore`] over
//!   `prana-db`.
//! - [`delivery`]: push-provider seam ([`PushDispatcher`]) and the Firebase
//!   Cloud Messaging channel.
//! - [`AlertTrigger`]: the creation event and its document path.

pub mod delivery;
pub mod notifier;
pub mod store;
pub mod trigger;

pub use delivery::fcm::{FcmConfig, FcmDispatcher};
pub use delivery::{DispatchError, PushDispatcher};
pub use notifier::{AlertNotifier, NotifyError, NotifyOutcome};
pub use store::{PgUserStore, StoreError, UserStore};
pub use trigger::AlertTrigger;
