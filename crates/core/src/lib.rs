//! Domain types shared by the PRANA-G alert notifier crates.
//!
//! Nothing in here performs I/O. The store and push-provider seams live in
//! `prana-events`; this crate only describes the records flowing through them.

pub mod alert;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod payload;
pub mod types;
pub mod value;
