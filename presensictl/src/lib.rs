//! Library part of the `presensictl` utility.
//!
//! The heavy lifting (acquisition strategies, geofence evaluation, the
//! submission gate) lives in the `presensi-geoloc` crate; this one only holds
//! the command-line surface and the configuration file around it.
//!

// Re-export
//
pub use cli::*;
pub use cmds::*;
pub use config::*;

mod cli;
mod cmds;
mod config;
