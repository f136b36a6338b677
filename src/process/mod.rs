//! Supervised process: platform, launcher and lifecycle controller.
//!
//! ## Contents
//! - [`Platform`] host family, resolved once at startup
//! - [`Launcher`], [`ServerProcess`], [`CommandLauncher`] spawning and addressing the child
//! - [`ServerController`] start / command / graceful and immediate stop

mod controller;
mod launcher;
mod platform;

pub use controller::ServerController;
pub use launcher::{CommandLauncher, LaunchSpec, Launcher, ServerProcess};
pub use platform::Platform;
