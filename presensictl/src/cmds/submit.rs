//! This is the module handling the `submit` sub-command.
//!

use chrono::Local;
use eyre::Result;
use tracing::{info, trace, warn};

use presensi_geoloc::replay::ReplayProvider;
use presensi_geoloc::{
    acquire_position, format_message, Environment, MemoryLog, ScanSession, StaffRole,
    SubmissionGate, Teacher, TelegramNotifier,
};

use crate::{Config, SubmitOpts};

/// Full check-in: acquisition, gate, record, notification.
///
#[tracing::instrument(skip(cfg))]
pub async fn submit_attendance(cfg: &Config, sopts: &SubmitOpts) -> Result<()> {
    trace!("submit {} from {:?}", sopts.kind, sopts.replay);

    let mut session = ScanSession::new(cfg.geofence());

    // Absence categories skip acquisition entirely.
    //
    if sopts.kind.requires_location() {
        let provider = ReplayProvider::from_path(&sopts.replay)?;
        let env = match &sopts.user_agent {
            Some(ua) => Environment::detect(ua),
            None => Environment::Standard,
        };
        info!("environment profile: {env}");
        acquire_position(&provider, &mut session, env).await?;
    }

    let teacher = Teacher {
        id: sopts.nik.clone(),
        name: sopts.name.clone(),
        nik: sopts.nik.clone(),
        role: StaffRole::Teacher,
        school_id: "default".to_string(),
    };

    let gate = SubmissionGate::new(cfg.late_cutoff_hour());
    let mut log = MemoryLog::new();
    let record = gate.submit(
        &session,
        &mut log,
        &teacher,
        sopts.kind,
        sopts.reason.as_deref(),
        Local::now().fixed_offset(),
    )?;

    println!("{}", serde_json::to_string_pretty(&record)?);

    // The record stands regardless of what happens to the notification.
    //
    if sopts.notify {
        match &cfg.telegram {
            Some(tg) => {
                TelegramNotifier::new(&tg.token, &tg.chat_id)
                    .notify(&record)
                    .await
            }
            None => warn!("no telegram sink configured, skipping notification"),
        }
    } else {
        eprintln!("--- notification preview ---");
        eprintln!("{}", format_message(&record));
    }
    Ok(())
}
