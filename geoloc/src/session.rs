//! Owned state for one attendance scan.
//!
//! The UI used to keep the current fix and verdict in shared mutable state;
//! here it is an explicit [ScanSession] object that acquisition publishes into
//! and the gate reads from.  Every acquisition invocation gets a generation
//! token so a late-resolving stale attempt can never overwrite what a newer
//! one already published.
//!

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::{evaluate, GeofenceConfig, GeofenceVerdict, LocationCache, PositionSample};

/// Proof of which acquisition invocation a publish belongs to.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AttemptToken(u64);

#[derive(Debug)]
pub struct ScanSession {
    config: GeofenceConfig,
    cache: LocationCache,
    latest: Option<PositionSample>,
    verdict: Option<GeofenceVerdict>,
    generation: u64,
}

impl ScanSession {
    pub fn new(config: GeofenceConfig) -> Self {
        ScanSession {
            config,
            cache: LocationCache::new(),
            latest: None,
            verdict: None,
            generation: 0,
        }
    }

    pub fn config(&self) -> &GeofenceConfig {
        &self.config
    }

    /// Start a new acquisition invocation, invalidating tokens of older ones.
    ///
    pub fn start_attempt(&mut self) -> AttemptToken {
        self.generation += 1;
        AttemptToken(self.generation)
    }

    /// The cached fix, when still fresh at `now`.
    ///
    pub fn cached(&self, now: DateTime<Utc>) -> Option<PositionSample> {
        self.cache.fresh(now)
    }

    /// Re-evaluate and adopt a cached fix without going through the publish
    /// filter (it is the fix we already had).
    ///
    pub fn adopt_cached(&mut self, sample: PositionSample) -> GeofenceVerdict {
        let verdict = evaluate(&sample, &self.config);
        self.latest = Some(sample);
        self.verdict = Some(verdict);
        verdict
    }

    /// Feed one acquired sample into the session.
    ///
    /// Returns the new verdict when the sample was published, `None` when it
    /// was filtered out (worse accuracy, no movement) or came from a stale
    /// attempt.
    ///
    pub fn publish(
        &mut self,
        token: &AttemptToken,
        sample: PositionSample,
    ) -> Option<GeofenceVerdict> {
        if token.0 != self.generation {
            trace!("dropping sample from stale attempt {}", token.0);
            return None;
        }
        if !crate::should_publish(self.latest.as_ref(), &sample) {
            trace!("sample filtered out: {sample:?}");
            return None;
        }

        let verdict = evaluate(&sample, &self.config);
        self.latest = Some(sample);
        self.verdict = Some(verdict);
        self.cache.store(sample);
        Some(verdict)
    }

    /// Currently published fix, if any.
    ///
    pub fn latest(&self) -> Option<&PositionSample> {
        self.latest.as_ref()
    }

    /// Verdict matching the currently published fix.
    ///
    pub fn verdict(&self) -> Option<&GeofenceVerdict> {
        self.verdict.as_ref()
    }

    /// Explicit refresh: drop the cache and the published fix, invalidate any
    /// in-flight attempt.
    ///
    pub fn refresh(&mut self) {
        self.cache.clear();
        self.latest = None;
        self.verdict = None;
        self.generation += 1;
    }
}
