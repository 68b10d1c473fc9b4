//! Route tree.
//!
//! ```text
//! GET  /health                                       service and database health
//! POST /triggers/users/{uid}/alerts/{alert_id}       alert created (record as body)
//! POST /triggers/alert-created                       alert created (document change envelope)
//! ```

pub mod health;
pub mod triggers;
