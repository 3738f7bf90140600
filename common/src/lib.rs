//! This library is there to share some common code amongst all presensi modules.
//!

mod config;
mod logging;
mod macros;

use clap::{crate_name, crate_version};

pub use config::*;
pub use logging::*;

const NAME: &str = crate_name!();
const VERSION: &str = crate_version!();

pub fn version() -> String {
    format!("{}/{}", NAME, VERSION)
}
