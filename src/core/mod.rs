//! Runtime core: configuration, the supervisor loop and its waits.
//!
//! The public API from this module is [`Supervisor`] (built through
//! [`SupervisorBuilder`]), its [`Config`] and the [`SupervisorState`] it reports.
//!
//! Internal modules:
//! - [`supervisor`]: the check/update/backup/restart loop and the shutdown path;
//! - [`builder`]: wires collaborators, directories and subscribers;
//! - [`wait`]: sleeps and futures that lose to the shutdown token;
//! - [`shutdown`]: cross-platform shutdown signal handling;
//! - [`config`]: TOML configuration with defaults.

mod builder;
mod config;
mod shutdown;
mod state;
mod supervisor;
pub(crate) mod wait;

pub use builder::SupervisorBuilder;
pub use config::Config;
pub use shutdown::ShutdownSignal;
pub use state::SupervisorState;
pub use supervisor::Supervisor;
