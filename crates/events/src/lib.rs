//! Asset register event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`RegisterEvent`]: the change notification envelope.
//! - [`AuditLog`]: background subscriber that writes every event to the log.

pub mod audit;
pub mod bus;

pub use audit::AuditLog;
pub use bus::{event_types, EventBus, RegisterEvent};
