//! Module to deal with acquiring a device position and validating it against the
//! school geofence.
//!
//! The different submodules deal with the stages of an attendance scan:
//!
//! - obtaining position fixes from a platform provider (one-shot or continuous)
//! - filtering/caching fixes and evaluating them against the configured fence
//! - gating the actual attendance submission and notifying the outside world
//!

// Re-export these modules for a shorter import path.
//
pub use distance::*;
pub use error::*;
pub use fence::*;
pub use gate::*;
pub use notify::*;
pub use position::*;
pub use provider::*;
pub use session::*;
pub use strategy::*;
pub use tracker::*;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version() -> String {
    format!("{}/{}", NAME, VERSION)
}

mod distance;
mod error;
mod fence;
mod gate;
mod notify;
mod position;
mod provider;
mod session;
mod strategy;
mod tracker;
