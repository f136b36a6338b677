//! # Event subscribers for the supervisor.
//!
//! This module provides the [`Subscribe`] trait, the non-blocking [`SubscriberSet`]
//! fan-out and the built-in [`LogWriter`] console subscriber.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Supervisor ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                            │
//!                                                  ┌─────────┼─────────┐
//!                                                  ▼         ▼         ▼
//!                                              LogWriter   Custom     ...
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
