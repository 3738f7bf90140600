//! End-to-end acquisition runs over a scripted provider.

use chrono::{DateTime, FixedOffset, TimeZone};

use presensi_geoloc::replay::ReplayProvider;
use presensi_geoloc::{
    acquire_position, Acquire, AttendanceKind, ConstrainedStrategy, Coordinate, Environment,
    GateError, GeoError, GeofenceConfig, GeofenceVerdict, MemoryLog, PermissionState, ScanSession,
    StaffRole, StandardStrategy, SubmissionGate, Teacher,
};

const SCHOOL: Coordinate = Coordinate {
    latitude: -6.2,
    longitude: 106.8,
};

fn session() -> ScanSession {
    ScanSession::new(GeofenceConfig::new(SCHOOL, 100.))
}

fn teacher() -> Teacher {
    Teacher {
        id: "t-1".to_string(),
        name: "Budi Santoso".to_string(),
        nik: "19870101".to_string(),
        role: StaffRole::Teacher,
        school_id: "sch-1".to_string(),
    }
}

fn now_wib() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(7 * 3600)
        .unwrap()
        .with_ymd_and_hms(2025, 1, 15, 7, 0, 0)
        .unwrap()
}

#[tokio::test]
async fn standard_fast_then_accurate() {
    let script = "\
delay_ms,outcome,latitude,longitude,accuracy_m
10,fix,-6.2001,106.8001,150.0
10,fix,-6.2,106.8,12.0
";
    let provider = ReplayProvider::from_csv(script).unwrap();
    let mut session = session();

    let strategy = StandardStrategy::default();
    let fix = strategy.acquire(&provider, &mut session).await.unwrap();

    assert_eq!(12., fix.accuracy_m);
    assert_eq!(12., session.latest().unwrap().accuracy_m);
    assert!(matches!(
        session.verdict(),
        Some(GeofenceVerdict::Inside { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn standard_retries_until_accurate_fix() {
    let script = "\
delay_ms,outcome,latitude,longitude,accuracy_m
0,unavailable,,,
0,unavailable,,,
0,fix,-6.2,106.8,20.0
";
    let provider = ReplayProvider::from_csv(script).unwrap();
    let mut session = session();

    // row 1 kills the fast read, row 2 the first accurate attempt
    let fix = StandardStrategy::default()
        .acquire(&provider, &mut session)
        .await
        .unwrap();
    assert_eq!(20., fix.accuracy_m);
}

#[tokio::test(start_paused = true)]
async fn standard_exhausted_surfaces_failure_and_gate_stays_blocked() {
    let script = "\
delay_ms,outcome,latitude,longitude,accuracy_m
0,unavailable,,,
0,unavailable,,,
0,unavailable,,,
0,timeout,,,
";
    let provider = ReplayProvider::from_csv(script).unwrap();
    let mut session = session();

    let res = StandardStrategy::default()
        .acquire(&provider, &mut session)
        .await;
    assert_eq!(Err(GeoError::Timeout), res);
    assert!(session.latest().is_none());

    // no fix ever published, so the gate refuses the located submission
    let gate = SubmissionGate::default();
    let mut log = MemoryLog::new();
    let res = gate.submit(
        &session,
        &mut log,
        &teacher(),
        AttendanceKind::In,
        None,
        now_wib(),
    );
    assert_eq!(Err(GateError::NoPosition), res.map(|_| ()));
}

#[tokio::test]
async fn constrained_denied_permission_is_terminal() {
    let provider = ReplayProvider::from_csv("delay_ms,outcome,latitude,longitude,accuracy_m\n")
        .unwrap()
        .with_permission(PermissionState::Denied);
    let mut session = session();

    let res = ConstrainedStrategy::default()
        .acquire(&provider, &mut session)
        .await;
    assert_eq!(Err(GeoError::PermissionDenied), res);
}

#[tokio::test]
async fn constrained_accepts_early_on_good_accuracy() {
    let script = "\
delay_ms,outcome,latitude,longitude,accuracy_m
10,fix,-6.2,106.8,30.0
10,fix,-6.2,106.8,5.0
";
    let provider = ReplayProvider::from_csv(script)
        .unwrap()
        .with_permission(PermissionState::Granted);
    let mut session = session();

    let fix = ConstrainedStrategy::default()
        .acquire(&provider, &mut session)
        .await
        .unwrap();

    // 30 m is already better than the 50 m threshold: one attempt, the second
    // row stays unread
    assert_eq!(30., fix.accuracy_m);
}

#[tokio::test(start_paused = true)]
async fn constrained_keeps_best_of_all_attempts() {
    let script = "\
delay_ms,outcome,latitude,longitude,accuracy_m
0,fix,-6.2,106.8,90.0
0,fix,-6.2,106.8,60.0
0,fix,-6.2,106.8,75.0
";
    let provider = ReplayProvider::from_csv(script)
        .unwrap()
        .with_permission(PermissionState::Granted);
    let mut session = session();

    let fix = ConstrainedStrategy::default()
        .acquire(&provider, &mut session)
        .await
        .unwrap();

    // nothing under 50 m: all three attempts run, the best one wins
    assert_eq!(60., fix.accuracy_m);
    assert_eq!(60., session.latest().unwrap().accuracy_m);
}

#[tokio::test(start_paused = true)]
async fn acquisition_consults_the_cache_first() {
    let script = "\
delay_ms,outcome,latitude,longitude,accuracy_m
10,fix,-6.2,106.8,25.0
";
    let provider = ReplayProvider::from_csv(script).unwrap();
    let mut session = session();

    let first = acquire_position(&provider, &mut session, Environment::Standard)
        .await
        .unwrap();
    assert_eq!(25., first.accuracy_m);

    // the script is exhausted, only the cache can answer now
    let second = acquire_position(&provider, &mut session, Environment::Standard)
        .await
        .unwrap();
    assert_eq!(first.coordinate, second.coordinate);
}

#[tokio::test(start_paused = true)]
async fn refresh_forces_reacquisition() {
    let script = "\
delay_ms,outcome,latitude,longitude,accuracy_m
10,fix,-6.2001,106.8001,25.0
10,fix,-6.2,106.8,8.0
0,denied,,,
0,denied,,,
";
    let provider = ReplayProvider::from_csv(script).unwrap();
    let mut session = session();

    acquire_position(&provider, &mut session, Environment::Standard)
        .await
        .unwrap();

    session.refresh();
    let res = acquire_position(&provider, &mut session, Environment::Standard).await;
    assert_eq!(Err(GeoError::PermissionDenied), res);
}
