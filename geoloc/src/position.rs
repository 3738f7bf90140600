//! Position related types.
//!
//! A [PositionSample] is one fix as reported by the platform provider, the
//! reported accuracy being the radius of uncertainty around the coordinate.
//! Samples are short-lived: the [LocationCache] keeps the last good one around
//! for 30 s so that a user tapping "scan" twice in a row does not trigger a
//! whole new acquisition round.
//!

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::distance;

/// Below this positional delta, a sample with worse accuracy does not replace
/// the currently published one.
pub const MIN_MOVE_M: f64 = 5.0;

/// How long a cached fix stays usable.
pub const CACHE_TTL_SECS: i64 = 30;

/// A WGS-84 coordinate in degrees.
///
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }

    /// Both components are actual numbers (callers must check before asking
    /// for a distance, NaN propagates).
    ///
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// One fix as produced by an acquisition strategy.
///
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct PositionSample {
    pub coordinate: Coordinate,
    /// Radius of uncertainty in meters, always >= 0.
    pub accuracy_m: f64,
    pub captured_at: DateTime<Utc>,
}

impl PositionSample {
    pub fn new(coordinate: Coordinate, accuracy_m: f64) -> Self {
        PositionSample {
            coordinate,
            accuracy_m: accuracy_m.max(0.),
            captured_at: Utc::now(),
        }
    }
}

/// Decide whether `next` may replace the currently published sample.
///
/// A sample only goes through when its accuracy is equal-or-better, or when the
/// device moved more than [MIN_MOVE_M] since the last published point.  This
/// keeps low-quality reads from flickering over a good fix within a session.
///
pub fn should_publish(prev: Option<&PositionSample>, next: &PositionSample) -> bool {
    match prev {
        None => true,
        Some(prev) => {
            next.accuracy_m <= prev.accuracy_m
                || distance(&prev.coordinate, &next.coordinate) > MIN_MOVE_M
        }
    }
}

/// Last good fix, kept for [CACHE_TTL_SECS].
///
#[derive(Clone, Debug, Default)]
pub struct LocationCache {
    entry: Option<CacheEntry>,
}

#[derive(Clone, Debug)]
struct CacheEntry {
    sample: PositionSample,
    expires_at: DateTime<Utc>,
}

impl LocationCache {
    pub fn new() -> Self {
        LocationCache::default()
    }

    /// Store a fix, restarting the expiry clock.
    ///
    pub fn store(&mut self, sample: PositionSample) {
        self.entry = Some(CacheEntry {
            sample,
            expires_at: Utc::now() + TimeDelta::seconds(CACHE_TTL_SECS),
        });
    }

    /// Return the cached fix if it has not expired at `now`.
    ///
    pub fn fresh(&self, now: DateTime<Utc>) -> Option<PositionSample> {
        self.entry
            .as_ref()
            .filter(|e| now < e.expires_at)
            .map(|e| e.sample)
    }

    /// Explicit refresh drops whatever we had.
    ///
    pub fn clear(&mut self) {
        self.entry = None;
    }
}
