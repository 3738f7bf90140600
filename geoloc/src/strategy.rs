//! Location acquisition strategies.
//!
//! Two profiles behind one trait:
//!
//! - [StandardStrategy]: fast low-accuracy read first, published immediately,
//!   then a high-accuracy refinement with retries.
//! - [ConstrainedStrategy]: for embedded web-views with their restricted
//!   permission model.  Permission pre-check, then a bounded polling loop that
//!   keeps the best fix seen and accepts early on good accuracy.
//!
//! Which one runs is decided by [Environment::detect] on the client's
//! user-agent string.
//!

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::time::{sleep, timeout};
use tracing::{debug, trace, warn};

use crate::{
    GeoError, PermissionState, PositionProvider, PositionSample, RequestOpts, ScanSession,
    WatchOpts,
};

/// Host environment profile.
///
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    #[default]
    Standard,
    Embedded,
}

impl Environment {
    /// Probe the client user-agent for web-view markers.
    ///
    /// Android web-views carry a `wv` token, an `Version/N` product, or
    /// identify as android without chrome; iOS web-views lack the `Safari`
    /// product.
    ///
    pub fn detect(user_agent: &str) -> Self {
        let ua = user_agent.to_lowercase();

        let android = ua.contains("android");
        let android_webview = android
            && (ua.contains("wv")
                || ua.contains("androidwebkit")
                || !ua.contains("chrome")
                || has_version_token(&ua));

        let ios = ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod");
        let ios_webview = ios && !ua.contains("safari");

        if android_webview || ios_webview {
            Environment::Embedded
        } else {
            Environment::Standard
        }
    }

    /// The acquisition strategy matching this profile.
    ///
    pub fn strategy(&self) -> Box<dyn Acquire> {
        match self {
            Environment::Standard => Box::<StandardStrategy>::default(),
            Environment::Embedded => Box::<ConstrainedStrategy>::default(),
        }
    }
}

/// `Version/<digit>` in an android UA is a system web-view marker.
///
fn has_version_token(ua: &str) -> bool {
    ua.split("version/")
        .nth(1)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}

/// One acquisition profile.
///
#[async_trait]
pub trait Acquire: Send + Sync {
    /// Run the whole profile, publishing intermediate fixes into `session` and
    /// returning the best fix obtained by this invocation.
    ///
    async fn acquire(
        &self,
        provider: &dyn PositionProvider,
        session: &mut ScanSession,
    ) -> Result<PositionSample, GeoError>;

    /// Watch tuning for the continuous-tracking phase of this profile.
    ///
    fn watch_opts(&self) -> WatchOpts;
}

/// Consult the cache first, then run the profile matching `env`.
///
#[tracing::instrument(skip(provider, session))]
pub async fn acquire_position(
    provider: &dyn PositionProvider,
    session: &mut ScanSession,
    env: Environment,
) -> Result<PositionSample, GeoError> {
    if let Some(sample) = session.cached(Utc::now()) {
        debug!("using cached fix: {sample:?}");
        session.adopt_cached(sample);
        return Ok(sample);
    }

    env.strategy().acquire(provider, session).await
}

/// Standard browser profile: fast read, accurate refinement with retries.
///
#[derive(Clone, Copy, Debug)]
pub struct StandardStrategy {
    pub fast_timeout: Duration,
    pub accurate_timeout: Duration,
    pub retries: u32,
    pub backoff: Duration,
}

impl Default for StandardStrategy {
    fn default() -> Self {
        StandardStrategy {
            fast_timeout: Duration::from_secs(3),
            accurate_timeout: Duration::from_secs(8),
            retries: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

#[async_trait]
impl Acquire for StandardStrategy {
    #[tracing::instrument(skip(self, provider, session))]
    async fn acquire(
        &self,
        provider: &dyn PositionProvider,
        session: &mut ScanSession,
    ) -> Result<PositionSample, GeoError> {
        let token = session.start_attempt();
        let mut best: Option<PositionSample> = None;

        // Fast low-accuracy read first, published right away so the UI has
        // something while the refinement runs.
        //
        let opts = RequestOpts::fast(self.fast_timeout);
        match timeout(self.fast_timeout, provider.current_position(opts)).await {
            Ok(Ok(sample)) => {
                trace!("fast fix: {sample:?}");
                session.publish(&token, sample);
                best = Some(sample);
            }
            Ok(Err(e)) => debug!("fast read failed: {e}"),
            Err(_) => debug!("fast read timed out"),
        }

        // High-accuracy refinement, retried with a fixed backoff.
        //
        let mut last_err = None;
        for attempt in 1..=self.retries {
            let opts = RequestOpts::accurate(self.accurate_timeout);
            match timeout(self.accurate_timeout, provider.current_position(opts)).await {
                Ok(Ok(sample)) => {
                    trace!("accurate fix on attempt {attempt}: {sample:?}");
                    session.publish(&token, sample);
                    best = Some(keep_best(best, sample));
                    last_err = None;
                    break;
                }
                Ok(Err(GeoError::PermissionDenied)) => return Err(GeoError::PermissionDenied),
                Ok(Err(e)) => {
                    warn!("accurate attempt {attempt} failed: {e}");
                    last_err = Some(e);
                }
                Err(_) => {
                    warn!("accurate attempt {attempt} timed out");
                    last_err = Some(GeoError::Timeout);
                }
            }
            if attempt < self.retries {
                sleep(self.backoff).await;
            }
        }

        match best {
            Some(sample) => Ok(sample),
            None => Err(last_err.unwrap_or(GeoError::PositionUnavailable)),
        }
    }

    fn watch_opts(&self) -> WatchOpts {
        WatchOpts {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            max_age: Duration::from_secs(5),
        }
    }
}

/// Embedded web-view profile: permission pre-check, then a bounded polling
/// loop keeping the best fix seen.
///
#[derive(Clone, Copy, Debug)]
pub struct ConstrainedStrategy {
    pub attempts: u32,
    pub first_timeout: Duration,
    pub retry_timeout: Duration,
    pub backoff: Duration,
    /// Accept early once a fix is better than this.
    pub accept_accuracy_m: f64,
}

impl Default for ConstrainedStrategy {
    fn default() -> Self {
        ConstrainedStrategy {
            attempts: 3,
            first_timeout: Duration::from_secs(4),
            retry_timeout: Duration::from_secs(8),
            backoff: Duration::from_secs(1),
            accept_accuracy_m: 50.,
        }
    }
}

impl ConstrainedStrategy {
    /// Permission negotiation for hosts where the query is unreliable: a
    /// `denied` answer is final, anything else is confirmed with a quick
    /// low-accuracy probe.
    ///
    async fn check_permission(&self, provider: &dyn PositionProvider) -> Result<(), GeoError> {
        match provider.permission_state().await {
            PermissionState::Denied => Err(GeoError::PermissionDenied),
            PermissionState::Granted => Ok(()),
            PermissionState::Prompt | PermissionState::Unknown => {
                let opts = RequestOpts {
                    high_accuracy: false,
                    timeout: self.first_timeout,
                    max_age: Duration::from_secs(300),
                };
                match timeout(Duration::from_secs(5), provider.current_position(opts)).await {
                    Ok(Err(GeoError::PermissionDenied)) => Err(GeoError::PermissionDenied),
                    // Any other answer means the prompt went through; the
                    // polling loop will sort out the actual fix.
                    _ => Ok(()),
                }
            }
        }
    }
}

#[async_trait]
impl Acquire for ConstrainedStrategy {
    #[tracing::instrument(skip(self, provider, session))]
    async fn acquire(
        &self,
        provider: &dyn PositionProvider,
        session: &mut ScanSession,
    ) -> Result<PositionSample, GeoError> {
        self.check_permission(provider).await?;

        let token = session.start_attempt();
        let mut best: Option<PositionSample> = None;
        let mut last_err = None;

        for attempt in 1..=self.attempts {
            // Start fast, then accurate.
            //
            let opts = if attempt == 1 {
                RequestOpts::fast(self.first_timeout)
            } else {
                RequestOpts::accurate(self.retry_timeout)
            };

            match timeout(opts.timeout, provider.current_position(opts)).await {
                Ok(Ok(sample)) => {
                    if best.is_none_or(|b| sample.accuracy_m < b.accuracy_m) {
                        trace!("better fix on attempt {attempt}: {sample:?}");
                        best = Some(sample);
                        session.publish(&token, sample);
                    }
                    if sample.accuracy_m < self.accept_accuracy_m {
                        break;
                    }
                }
                Ok(Err(GeoError::PermissionDenied)) => return Err(GeoError::PermissionDenied),
                Ok(Err(e)) => {
                    warn!("attempt {attempt} failed: {e}");
                    last_err = Some(e);
                }
                Err(_) => {
                    warn!("attempt {attempt} timed out");
                    last_err = Some(GeoError::Timeout);
                }
            }
            if attempt < self.attempts {
                sleep(self.backoff).await;
            }
        }

        // Exhausted: surface whichever fix was best, or the last error.
        //
        match best {
            Some(sample) => Ok(sample),
            None => Err(last_err.unwrap_or(GeoError::PositionUnavailable)),
        }
    }

    fn watch_opts(&self) -> WatchOpts {
        // Less aggressive in a web-view to save battery.
        //
        WatchOpts {
            high_accuracy: false,
            timeout: Duration::from_secs(15),
            max_age: Duration::from_secs(5),
        }
    }
}

fn keep_best(best: Option<PositionSample>, next: PositionSample) -> PositionSample {
    match best {
        Some(b) if b.accuracy_m < next.accuracy_m => b,
        _ => next,
    }
}
