//! PRANA-G alert notifier HTTP host.
//!
//! Receives alert-created triggers and runs them through the
//! [`prana_events::AlertNotifier`]. The building blocks (config, state, error
//! mapping, routes) are exposed so integration tests and the binary share
//! them.

pub mod config;
pub mod error;
pub mod router;
pub mod routes;
pub mod state;
