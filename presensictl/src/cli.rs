//! Module describing all possible commands and sub-commands to the `presensictl` main driver.
//!
//! We have three main commands:
//!
//! - `check` evaluates one coordinate against the configured school fence
//! - `acquire` runs the full acquisition strategy over a replayed provider script
//! - `submit` runs acquisition, then the submission gate, and prints the record
//!
//! `completion` is here just to configure the various shells completion system.
//!

use std::path::PathBuf;

use clap::{crate_authors, crate_description, crate_name, crate_version, Parser};
use clap_complete::shells::Shell;

use presensi_geoloc::AttendanceKind;

/// CLI options
#[derive(Parser)]
#[command(disable_version_flag = true)]
#[clap(name = crate_name!(), about = crate_description!())]
#[clap(version = crate_version!(), author = crate_authors!())]
pub struct Opts {
    /// configuration file.
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,
    /// Hierarchical log output.
    #[clap(short = 'T', long)]
    pub tree: bool,
    /// Sub-commands (see below).
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

// ------

/// All sub-commands:
///
/// `check LAT LON [-a ACCURACY]`
/// `acquire [-u UA] REPLAY`
/// `submit [-u UA] [-k KIND] [-r REASON] [--notify] REPLAY`
/// `completion SHELL`
/// `version`
///
#[derive(Debug, Parser)]
pub enum SubCommand {
    /// Evaluate a coordinate against the school fence
    Check(CheckOpts),
    /// Run the acquisition strategy over a replay script
    Acquire(AcquireOpts),
    /// Full check-in: acquisition, gate, record, notification
    Submit(SubmitOpts),
    /// Generate Completion stuff
    Completion(ComplOpts),
    /// Display utility full version
    Version,
}

// ------

/// Options for evaluating a single fix.
///
#[derive(Debug, Parser)]
#[command(allow_negative_numbers = true)]
pub struct CheckOpts {
    /// Reported GPS accuracy in meters.
    #[clap(short = 'a', long, default_value = "0")]
    pub accuracy: f64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

// ------

/// Options for a replayed acquisition run.
///
#[derive(Debug, Parser)]
pub struct AcquireOpts {
    /// Client user-agent, drives the profile selection.
    #[clap(short = 'u', long)]
    pub user_agent: Option<String>,
    /// Keep tracking after the first fix until the script runs out.
    #[clap(short = 'w', long)]
    pub watch: bool,
    /// Replay script (CSV).
    pub replay: PathBuf,
}

// ------

/// Options for a full submission run.
///
#[derive(Debug, Parser)]
pub struct SubmitOpts {
    /// Client user-agent, drives the profile selection.
    #[clap(short = 'u', long)]
    pub user_agent: Option<String>,
    /// Attendance category.
    #[clap(short = 'k', long, default_value = "in")]
    pub kind: AttendanceKind,
    /// Reason, required for izin/alpha.
    #[clap(short = 'r', long)]
    pub reason: Option<String>,
    /// Teacher display name.
    #[clap(short = 'n', long, default_value = "Guru Demo")]
    pub name: String,
    /// Staff registration number.
    #[clap(long, default_value = "000000")]
    pub nik: String,
    /// Actually send the Telegram notification.
    #[clap(long)]
    pub notify: bool,
    /// Replay script (CSV).
    pub replay: PathBuf,
}

// ------

/// Options for the `completion` sub-command.
///
#[derive(Debug, Parser)]
pub struct ComplOpts {
    #[clap(value_parser)]
    pub shell: Shell,
}
