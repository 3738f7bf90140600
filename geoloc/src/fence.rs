//! Geofence evaluation.
//!
//! The reported GPS accuracy is used as a confidence margin in the device's
//! favour, twice: once before comparing against the radius, and once more
//! before declaring a hard "outside".  A fix whose excess over the radius is
//! within its own accuracy is "borderline", possibly inside.  This permissive
//! bias near the boundary is a product decision, not an accident.
//!

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{distance, Coordinate, PositionSample};

/// The school boundary: a circle around the configured center.  Read-only for
/// the duration of a scan session.
///
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct GeofenceConfig {
    pub center: Coordinate,
    pub radius_m: f64,
}

impl GeofenceConfig {
    pub fn new(center: Coordinate, radius_m: f64) -> Self {
        GeofenceConfig { center, radius_m }
    }

    /// The settings store keeps `(0, 0)` when the school location was never
    /// set up, so that exact coordinate doubles as the "unset" sentinel.
    ///
    pub fn is_configured(&self) -> bool {
        self.center.latitude != 0. || self.center.longitude != 0.
    }
}

/// Outcome of checking one fix against the fence.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GeofenceVerdict {
    Inside {
        distance_m: f64,
    },
    Borderline {
        distance_m: f64,
        excess_m: f64,
    },
    Outside {
        distance_m: f64,
        excess_m: f64,
    },
    /// No school location configured, nothing to validate against.
    Unconfigured,
}

impl GeofenceVerdict {
    /// Inside and borderline fixes may be submitted.
    ///
    pub fn allows_submission(&self) -> bool {
        matches!(
            self,
            GeofenceVerdict::Inside { .. } | GeofenceVerdict::Borderline { .. }
        )
    }
}

impl Display for GeofenceVerdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GeofenceVerdict::Inside { distance_m } => {
                write!(f, "inside the school area (±{:.0} m)", distance_m)
            }
            GeofenceVerdict::Borderline { distance_m, .. } => {
                write!(f, "near the school area boundary (±{:.0} m)", distance_m)
            }
            GeofenceVerdict::Outside {
                distance_m,
                excess_m,
            } => {
                write!(
                    f,
                    "outside the school area (±{:.0} m, {:.0} m past the fence)",
                    distance_m, excess_m
                )
            }
            GeofenceVerdict::Unconfigured => write!(f, "school location not configured"),
        }
    }
}

/// Compare one fix against the fence.
///
pub fn evaluate(sample: &PositionSample, config: &GeofenceConfig) -> GeofenceVerdict {
    if !config.is_configured() {
        return GeofenceVerdict::Unconfigured;
    }

    let distance_m = distance(&sample.coordinate, &config.center);
    let effective = (distance_m - sample.accuracy_m).max(0.);

    if effective <= config.radius_m {
        GeofenceVerdict::Inside { distance_m }
    } else {
        let excess_m = effective - config.radius_m;
        if excess_m <= sample.accuracy_m {
            GeofenceVerdict::Borderline {
                distance_m,
                excess_m,
            }
        } else {
            GeofenceVerdict::Outside {
                distance_m,
                excess_m,
            }
        }
    }
}
