//! Configuration for the CLI tool: school fence, late cutoff and the Telegram
//! notification sink.
//!

use serde::Deserialize;

use presensi_common::{ConfigFile, Versioned};
use presensi_geoloc::{Coordinate, GeofenceConfig, DEFAULT_LATE_CUTOFF_HOUR};

use eyre::Result;

/// Current version
pub const CVERSION: usize = 1;

/// Main configuration struct, loaded from `config.hcl`.
///
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Version in the file MUST match
    pub version: usize,
    /// School location and fence, absent until the school is set up.
    pub school: Option<SchoolConfig>,
    /// Telegram notification sink.
    pub telegram: Option<TelegramConfig>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct SchoolConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
    /// Check-in later than this hour is "late".
    pub late_cutoff_hour: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

impl Versioned for Config {
    fn version(&self) -> usize {
        self.version
    }
}

impl Config {
    /// Load either the specified file or the default one.
    ///
    pub fn load(fname: Option<&str>) -> Result<Config> {
        let cfg = ConfigFile::<Config>::load(fname)?;
        Ok(cfg.into_inner().unwrap_or_default())
    }

    /// The fence as the library sees it; a missing school section maps to the
    /// unset sentinel and thus to `Unconfigured`.
    ///
    pub fn geofence(&self) -> GeofenceConfig {
        match &self.school {
            Some(s) => GeofenceConfig::new(Coordinate::new(s.latitude, s.longitude), s.radius_m),
            None => GeofenceConfig::default(),
        }
    }

    /// Cutoff hour for the late status.
    ///
    pub fn late_cutoff_hour(&self) -> u32 {
        self.school
            .as_ref()
            .and_then(|s| s.late_cutoff_hour)
            .unwrap_or(DEFAULT_LATE_CUTOFF_HOUR)
    }
}
