//! This is the module handling the `check` sub-command.
//!

use eyre::{eyre, Result};
use tracing::trace;

use presensi_geoloc::{distance, evaluate, Coordinate, PositionSample};

use crate::{CheckOpts, Config};

/// Evaluate one fix against the configured school fence.
///
#[tracing::instrument(skip(cfg))]
pub fn check_fix(cfg: &Config, copts: &CheckOpts) -> Result<()> {
    trace!("check {},{}", copts.lat, copts.lon);

    let coord = Coordinate::new(copts.lat, copts.lon);
    if !coord.is_finite() {
        return Err(eyre!("latitude/longitude must be finite numbers"));
    }

    let fence = cfg.geofence();
    let sample = PositionSample::new(coord, copts.accuracy);
    let verdict = evaluate(&sample, &fence);

    if fence.is_configured() {
        println!(
            "distance to school: {:.0} m (accuracy ±{:.0} m)",
            distance(&coord, &fence.center),
            sample.accuracy_m
        );
    }
    println!("{verdict}");
    Ok(())
}
