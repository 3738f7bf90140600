//! The platform positioning capability.
//!
//! Strategies talk to a [PositionProvider]: a one-shot "current position" with
//! accuracy/timeout/max-age options, a continuous cancellable watch, and an
//! advisory permission query.  The [replay] submodule offers a scripted
//! provider fed from a CSV file, used by `presensictl acquire` and the tests.
//!

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{GeoError, PositionSample};

/// Advisory only: not all environments implement the permission query, and a
/// `Granted` answer can still be followed by a denied request.
///
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
    #[default]
    Unknown,
}

/// Options for a one-shot position request.
///
#[derive(Clone, Copy, Debug)]
pub struct RequestOpts {
    pub high_accuracy: bool,
    /// Per-attempt deadline, not a global one.
    pub timeout: Duration,
    /// How stale a fix the provider may serve from its own cache.
    pub max_age: Duration,
}

impl RequestOpts {
    /// Fast low-accuracy read, generous max-age.
    ///
    pub fn fast(timeout: Duration) -> Self {
        RequestOpts {
            high_accuracy: false,
            timeout,
            max_age: Duration::from_secs(60),
        }
    }

    /// High-accuracy read, near-fresh fixes only.
    ///
    pub fn accurate(timeout: Duration) -> Self {
        RequestOpts {
            high_accuracy: true,
            timeout,
            max_age: Duration::from_secs(10),
        }
    }
}

/// Options for the continuous watch.
///
#[derive(Clone, Copy, Debug)]
pub struct WatchOpts {
    pub high_accuracy: bool,
    pub timeout: Duration,
    pub max_age: Duration,
}

/// A running watch registration.  This is an explicit resource: dropping it or
/// calling [PositionWatch::stop] cancels the underlying polling task, which
/// must happen on session teardown or we leak a background registration.
///
#[derive(Debug)]
pub struct PositionWatch {
    rx: mpsc::Receiver<Result<PositionSample, GeoError>>,
    handle: JoinHandle<()>,
}

impl PositionWatch {
    pub fn new(rx: mpsc::Receiver<Result<PositionSample, GeoError>>, handle: JoinHandle<()>) -> Self {
        PositionWatch { rx, handle }
    }

    /// Next event from the watch, `None` once the feed is exhausted.
    ///
    pub async fn recv(&mut self) -> Option<Result<PositionSample, GeoError>> {
        self.rx.recv().await
    }

    /// Cancel the registration.
    ///
    pub fn stop(&mut self) {
        self.handle.abort();
        self.rx.close();
    }
}

impl Drop for PositionWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// What a platform geolocation capability must offer.
///
#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Advisory permission query, `Unknown` when unsupported.
    ///
    async fn permission_state(&self) -> PermissionState {
        PermissionState::Unknown
    }

    /// One-shot position request.
    ///
    async fn current_position(&self, opts: RequestOpts) -> Result<PositionSample, GeoError>;

    /// Start a continuous watch.
    ///
    async fn watch_position(&self, opts: WatchOpts) -> Result<PositionWatch, GeoError>;
}

pub mod replay {
    //! Scripted position provider.
    //!
    //! The script is a CSV file, one row per provider answer:
    //!
    //! ```csv
    //! delay_ms,outcome,latitude,longitude,accuracy_m
    //! 200,fix,-6.2001,106.8167,120.0
    //! 500,fix,-6.2002,106.8166,25.0
    //! 1000,timeout,,,
    //! ```
    //!
    //! `outcome` is one of `fix`, `denied`, `unavailable`, `timeout`.  Rows are
    //! consumed in order; a row whose delay exceeds the caller's per-attempt
    //! timeout is reported as [GeoError::Timeout].
    //!

    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use eyre::Result;
    use serde::Deserialize;
    use tokio::sync::mpsc;
    use tokio::time::sleep;
    use tracing::trace;

    use super::{PermissionState, PositionProvider, PositionWatch, RequestOpts, WatchOpts};
    use crate::{Coordinate, GeoError, PositionSample};

    #[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Outcome {
        Fix,
        Denied,
        Unavailable,
        Timeout,
    }

    #[derive(Clone, Copy, Debug, Deserialize)]
    struct ScriptRow {
        delay_ms: u64,
        outcome: Outcome,
        latitude: Option<f64>,
        longitude: Option<f64>,
        accuracy_m: Option<f64>,
    }

    impl ScriptRow {
        fn answer(&self) -> Result<PositionSample, GeoError> {
            match self.outcome {
                Outcome::Fix => {
                    let lat = self.latitude.ok_or_else(|| {
                        GeoError::Unknown("fix row without a latitude".to_string())
                    })?;
                    let lon = self.longitude.ok_or_else(|| {
                        GeoError::Unknown("fix row without a longitude".to_string())
                    })?;
                    Ok(PositionSample::new(
                        Coordinate::new(lat, lon),
                        self.accuracy_m.unwrap_or(0.),
                    ))
                }
                Outcome::Denied => Err(GeoError::PermissionDenied),
                Outcome::Unavailable => Err(GeoError::PositionUnavailable),
                Outcome::Timeout => Err(GeoError::Timeout),
            }
        }
    }

    /// Replays a fixed script of provider answers.
    ///
    #[derive(Clone, Debug)]
    pub struct ReplayProvider {
        rows: Arc<Mutex<VecDeque<ScriptRow>>>,
        permission: PermissionState,
    }

    impl ReplayProvider {
        /// Load a script from a CSV file.
        ///
        pub fn from_path(path: &Path) -> Result<Self> {
            let mut rdr = csv::Reader::from_path(path)?;
            let rows = rdr
                .deserialize()
                .collect::<Result<VecDeque<ScriptRow>, _>>()?;
            Ok(ReplayProvider {
                rows: Arc::new(Mutex::new(rows)),
                permission: PermissionState::Unknown,
            })
        }

        /// Load a script from an in-memory CSV string.
        ///
        pub fn from_csv(data: &str) -> Result<Self> {
            let mut rdr = csv::Reader::from_reader(data.as_bytes());
            let rows = rdr
                .deserialize()
                .collect::<Result<VecDeque<ScriptRow>, _>>()?;
            Ok(ReplayProvider {
                rows: Arc::new(Mutex::new(rows)),
                permission: PermissionState::Unknown,
            })
        }

        /// Set the answer of the advisory permission query.
        ///
        pub fn with_permission(mut self, state: PermissionState) -> Self {
            self.permission = state;
            self
        }

        fn next_row(&self) -> Option<ScriptRow> {
            self.rows.lock().ok()?.pop_front()
        }
    }

    #[async_trait]
    impl PositionProvider for ReplayProvider {
        async fn permission_state(&self) -> PermissionState {
            self.permission
        }

        async fn current_position(&self, opts: RequestOpts) -> Result<PositionSample, GeoError> {
            let row = match self.next_row() {
                Some(row) => row,
                None => return Err(GeoError::PositionUnavailable),
            };
            trace!("replay row: {row:?}");

            let delay = Duration::from_millis(row.delay_ms);
            if delay >= opts.timeout {
                sleep(opts.timeout).await;
                return Err(GeoError::Timeout);
            }
            sleep(delay).await;
            row.answer()
        }

        async fn watch_position(&self, _opts: WatchOpts) -> Result<PositionWatch, GeoError> {
            let (tx, rx) = mpsc::channel(16);
            let rows = Arc::clone(&self.rows);

            let handle = tokio::spawn(async move {
                loop {
                    let row = match rows.lock() {
                        Ok(mut rows) => rows.pop_front(),
                        Err(_) => None,
                    };
                    let row = match row {
                        Some(row) => row,
                        None => break,
                    };
                    sleep(Duration::from_millis(row.delay_ms)).await;
                    if tx.send(row.answer()).await.is_err() {
                        break;
                    }
                }
            });

            Ok(PositionWatch::new(rx, handle))
        }
    }

}
