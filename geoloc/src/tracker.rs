//! Continuous position tracking.
//!
//! Once an acquisition succeeded, a [Tracker] keeps feeding improved fixes
//! into the session.  Updates that neither improve accuracy nor move the
//! device by more than the minimum-movement threshold are swallowed, which
//! bounds the update churn seen by the consumer.
//!

use tracing::{debug, warn};

use crate::{
    AttemptToken, GeofenceVerdict, PositionProvider, PositionWatch, ScanSession, WatchOpts,
};

/// A running tracking subscription.  Stop it (or drop it) on session teardown.
///
#[derive(Debug)]
pub struct Tracker {
    watch: PositionWatch,
    token: AttemptToken,
}

impl Tracker {
    /// Register a watch with the provider and tie it to the session's current
    /// attempt.
    ///
    pub async fn start(
        provider: &dyn PositionProvider,
        session: &mut ScanSession,
        opts: WatchOpts,
    ) -> Result<Self, crate::GeoError> {
        let token = session.start_attempt();
        let watch = provider.watch_position(opts).await?;
        debug!("tracking started: {opts:?}");
        Ok(Tracker { watch, token })
    }

    /// Wait for the next published update.
    ///
    /// Filtered and errored watch events are consumed silently (errors are
    /// logged); `None` means the watch ended.
    ///
    pub async fn next_update(&mut self, session: &mut ScanSession) -> Option<GeofenceVerdict> {
        loop {
            match self.watch.recv().await? {
                Ok(sample) => {
                    if let Some(verdict) = session.publish(&self.token, sample) {
                        return Some(verdict);
                    }
                }
                Err(e) => warn!("watch position error: {e}"),
            }
        }
    }

    /// Cancel the subscription.
    ///
    pub fn stop(mut self) {
        self.watch.stop();
        debug!("tracking stopped");
    }
}
