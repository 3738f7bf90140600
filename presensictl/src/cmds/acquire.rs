//! This is the module handling the `acquire` sub-command.
//!

use eyre::Result;
use tracing::{info, trace};

use presensi_geoloc::replay::ReplayProvider;
use presensi_geoloc::{acquire_position, Environment, ScanSession, Tracker};

use crate::{AcquireOpts, Config};

/// Run the full acquisition strategy over a replayed provider script.
///
#[tracing::instrument(skip(cfg))]
pub async fn acquire_from_replay(cfg: &Config, aopts: &AcquireOpts) -> Result<()> {
    trace!("acquire from {:?}", aopts.replay);

    let provider = ReplayProvider::from_path(&aopts.replay)?;
    let env = match &aopts.user_agent {
        Some(ua) => Environment::detect(ua),
        None => Environment::Standard,
    };
    info!("environment profile: {env}");

    let mut session = ScanSession::new(cfg.geofence());
    let fix = acquire_position(&provider, &mut session, env).await?;

    println!(
        "fix: {:.6},{:.6} ±{:.0} m",
        fix.coordinate.latitude, fix.coordinate.longitude, fix.accuracy_m
    );
    if let Some(verdict) = session.verdict() {
        println!("{verdict}");
    }

    // Keep consuming the script as a continuous watch.
    //
    if aopts.watch {
        let wopts = env.strategy().watch_opts();
        let mut tracker = Tracker::start(&provider, &mut session, wopts).await?;
        while let Some(verdict) = tracker.next_update(&mut session).await {
            if let Some(s) = session.latest() {
                println!(
                    "update: {:.6},{:.6} ±{:.0} m -> {verdict}",
                    s.coordinate.latitude, s.coordinate.longitude, s.accuracy_m
                );
            }
        }
        tracker.stop();
    }
    Ok(())
}
