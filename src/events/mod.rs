//! Supervisor events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publisher**: `Supervisor` (one event per state transition or failed step).
//! - **Consumers**: the supervisor's listener (fans out to `SubscriberSet`) and any
//!   receiver obtained through [`Supervisor::bus`](crate::Supervisor::bus).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
