use chrono::NaiveDate;
use thiserror::Error;

use crate::AttendanceKind;

/// Custom error type for position acquisition, allows us to differentiate
/// between the platform failure modes.  All of these are recoverable by
/// retrying the whole acquisition.
///
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Position unavailable")]
    PositionUnavailable,
    #[error("Timed out waiting for a position fix")]
    Timeout,
    #[error("Unknown geolocation error: {0}")]
    Unknown(String),
}

/// Why a submission was refused by the gate.
///
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GateError {
    #[error("No position fix available")]
    NoPosition,
    #[error("School location is not configured")]
    Unconfigured,
    #[error("Outside the school area: distance ±{distance_m:.0} m, {excess_m:.0} m past the fence (accuracy ±{accuracy_m:.0} m)")]
    OutsideGeofence {
        distance_m: f64,
        excess_m: f64,
        accuracy_m: f64,
    },
    #[error("A reason is required for {0} attendance")]
    MissingReason(AttendanceKind),
    #[error("Attendance \"{kind}\" already recorded for {date}")]
    Duplicate {
        kind: AttendanceKind,
        date: NaiveDate,
    },
}
