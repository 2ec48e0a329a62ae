//! Lineup event bus and notification dispatch.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the envelope published after every successful spot
//!   transition.
//! - [`NotificationDispatcher`]: the outbound seam, with structured-log and
//!   webhook implementations.
//! - [`DispatchWorker`]: background task draining the bus into a dispatcher.

pub mod bus;
pub mod dispatch;
pub mod error;
pub mod worker;

pub use bus::{EventBus, PlatformEvent};
pub use dispatch::log::LogDispatcher;
pub use dispatch::webhook::WebhookDispatcher;
pub use dispatch::{Notification, NotificationDispatcher};
pub use error::DispatchError;
pub use worker::DispatchWorker;
