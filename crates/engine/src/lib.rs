//! The spot assignment and confirmation lifecycle.
//!
//! [`SpotService`] owns every lifecycle operation. Each one is a single
//! conditional write against the [`SpotStore`](lineup_db::store::SpotStore)
//! followed by best-effort notification events on the bus; there is no
//! in-process mutable state shared between requests and the [`Scheduler`].

pub mod assignment;
pub mod config;
pub mod confirmation;
pub mod dashboard;
pub mod error;
pub mod extension;
pub mod reminders;
pub mod retry;
pub mod scheduler;
pub mod service;
pub mod sweeper;

pub use config::EngineConfig;
pub use error::EngineError;
pub use scheduler::Scheduler;
pub use service::SpotService;
