//! Domain building blocks for the lineup spot lifecycle.
//!
//! This crate has zero internal dependencies so the repository layer, the
//! lifecycle engine, the HTTP API, and the worker process all share the same
//! constants, state machine, urgency rules, and error taxonomy.

pub mod clock;
pub mod config;
pub mod error;
pub mod notifications;
pub mod reminders;
pub mod spot_lifecycle;
pub mod types;
pub mod urgency;
