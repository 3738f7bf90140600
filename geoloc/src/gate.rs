//! Attendance submission gate.
//!
//! At submit time the fence is re-evaluated against the latest cached fix,
//! never against an earlier verdict.  Check-in/check-out are location-gated;
//! excused/absent submissions skip the fence but must carry a reason.  One
//! record per (teacher, date, kind).
//!

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{evaluate, GateError, GeofenceVerdict, PositionSample, ScanSession};

/// Check-in after this hour is recorded as late.
pub const DEFAULT_LATE_CUTOFF_HOUR: u32 = 8;

/// The four attendance categories.
///
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceKind {
    /// Check-in
    In,
    /// Check-out
    Out,
    /// Excused absence ("izin")
    Izin,
    /// Unexcused absence ("alpha")
    Alpha,
}

impl AttendanceKind {
    /// Check-in/check-out happen at the school, so they go through the fence.
    ///
    pub fn requires_location(&self) -> bool {
        matches!(self, AttendanceKind::In | AttendanceKind::Out)
    }

    /// Absence categories need a written justification instead.
    ///
    pub fn requires_reason(&self) -> bool {
        matches!(self, AttendanceKind::Izin | AttendanceKind::Alpha)
    }

    /// Uppercase label used in notifications.
    ///
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceKind::In => "MASUK",
            AttendanceKind::Out => "PULANG",
            AttendanceKind::Izin => "IZIN",
            AttendanceKind::Alpha => "ALPHA",
        }
    }
}

/// Status stored on the record, derived from kind and submission time.
///
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    /// Check-in after the cutoff hour.
    #[strum(serialize = "terlambat")]
    #[serde(rename = "terlambat")]
    Late,
    Izin,
    Alpha,
}

/// Staff roles as shown in notifications.
///
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum StaffRole {
    Teacher,
    Staff,
    Admin,
}

impl Display for StaffRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StaffRole::Teacher => "Guru",
            StaffRole::Staff => "Tenaga Kependidikan",
            StaffRole::Admin => "Administrator",
        };
        write!(f, "{s}")
    }
}

/// Whoever is in front of the camera.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Teacher {
    pub id: String,
    pub name: String,
    /// Staff registration number (NIK/NIP).
    pub nik: String,
    pub role: StaffRole,
    pub school_id: String,
}

/// Recorded position, zeroed for non-located categories.
///
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct RecordedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: f64,
}

impl From<&PositionSample> for RecordedLocation {
    fn from(sample: &PositionSample) -> Self {
        RecordedLocation {
            latitude: sample.coordinate.latitude,
            longitude: sample.coordinate.longitude,
            accuracy_m: sample.accuracy_m,
        }
    }
}

/// The attendance document handed to the persistence layer.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AttendanceRecord {
    pub teacher_id: String,
    pub teacher_name: String,
    pub teacher_nik: String,
    /// ISO date, the dedup key component.
    pub date: NaiveDate,
    /// Local wall time, `HH:MM:SS`.
    pub time: String,
    pub timestamp: DateTime<Utc>,
    pub kind: AttendanceKind,
    pub status: AttendanceStatus,
    pub location: RecordedLocation,
    pub school_id: String,
    /// Reason for excused/absent categories, empty otherwise.
    pub note: String,
}

/// Where already-submitted records are looked up, one per (teacher, date,
/// kind).  The real store lives elsewhere; tests and the CLI use [MemoryLog].
///
pub trait AttendanceLog {
    fn exists(&self, teacher_id: &str, date: NaiveDate, kind: AttendanceKind) -> bool;
    fn append(&mut self, record: &AttendanceRecord);
}

/// In-memory log keyed by (teacher, date, kind).
///
#[derive(Debug, Default)]
pub struct MemoryLog {
    seen: HashSet<(String, NaiveDate, AttendanceKind)>,
}

impl MemoryLog {
    pub fn new() -> Self {
        MemoryLog::default()
    }
}

impl AttendanceLog for MemoryLog {
    fn exists(&self, teacher_id: &str, date: NaiveDate, kind: AttendanceKind) -> bool {
        self.seen.contains(&(teacher_id.to_string(), date, kind))
    }

    fn append(&mut self, record: &AttendanceRecord) {
        self.seen
            .insert((record.teacher_id.clone(), record.date, record.kind));
    }
}

/// The gate itself.
///
#[derive(Clone, Copy, Debug)]
pub struct SubmissionGate {
    pub late_cutoff_hour: u32,
}

impl Default for SubmissionGate {
    fn default() -> Self {
        SubmissionGate {
            late_cutoff_hour: DEFAULT_LATE_CUTOFF_HOUR,
        }
    }
}

impl SubmissionGate {
    pub fn new(late_cutoff_hour: u32) -> Self {
        SubmissionGate { late_cutoff_hour }
    }

    /// Validate and build the attendance record.
    ///
    /// `now` carries the local offset: the wall-clock side drives the date,
    /// time and late status, the instant side checks cache freshness.  On
    /// success the record is appended to `log`.
    ///
    #[tracing::instrument(skip(self, session, log))]
    pub fn submit(
        &self,
        session: &ScanSession,
        log: &mut dyn AttendanceLog,
        teacher: &Teacher,
        kind: AttendanceKind,
        reason: Option<&str>,
        now: DateTime<FixedOffset>,
    ) -> Result<AttendanceRecord, GateError> {
        let local = now.naive_local();

        // Located categories go through the fence, against the latest cached
        // fix rather than whatever verdict the UI last showed.
        //
        let location = if kind.requires_location() {
            let sample = session
                .cached(now.with_timezone(&Utc))
                .ok_or(GateError::NoPosition)?;
            let verdict = evaluate(&sample, session.config());
            debug!("submit-time verdict: {verdict}");

            match verdict {
                GeofenceVerdict::Inside { .. } | GeofenceVerdict::Borderline { .. } => {
                    RecordedLocation::from(&sample)
                }
                GeofenceVerdict::Outside {
                    distance_m,
                    excess_m,
                } => {
                    return Err(GateError::OutsideGeofence {
                        distance_m,
                        excess_m,
                        accuracy_m: sample.accuracy_m,
                    })
                }
                GeofenceVerdict::Unconfigured => return Err(GateError::Unconfigured),
            }
        } else {
            RecordedLocation::default()
        };

        // Absence categories need a non-empty justification.
        //
        let note = if kind.requires_reason() {
            match reason.map(str::trim).filter(|r| !r.is_empty()) {
                Some(r) => r.to_string(),
                None => return Err(GateError::MissingReason(kind)),
            }
        } else {
            String::new()
        };

        // One record per (teacher, date, kind).
        //
        let date = local.date();
        if log.exists(&teacher.id, date, kind) {
            return Err(GateError::Duplicate { kind, date });
        }

        let status = match kind {
            AttendanceKind::Izin => AttendanceStatus::Izin,
            AttendanceKind::Alpha => AttendanceStatus::Alpha,
            AttendanceKind::In if local.hour() >= self.late_cutoff_hour => AttendanceStatus::Late,
            _ => AttendanceStatus::Present,
        };

        let record = AttendanceRecord {
            teacher_id: teacher.id.clone(),
            teacher_name: teacher.name.clone(),
            teacher_nik: teacher.nik.clone(),
            date,
            time: local.format("%H:%M:%S").to_string(),
            timestamp: now.with_timezone(&Utc),
            kind,
            status,
            location,
            school_id: teacher.school_id.clone(),
            note,
        };
        log.append(&record);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{Coordinate, GeofenceConfig};

    fn wib(h: u32, m: u32) -> DateTime<FixedOffset> {
        // UTC+7, the deployment's timezone
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 15, h, m, 0)
            .unwrap()
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

    fn session_with_fix(acc: f64) -> ScanSession {
        let center = Coordinate::new(-6.2, 106.8);
        let mut session = ScanSession::new(GeofenceConfig::new(center, 100.));
        let token = session.start_attempt();
        session.publish(&token, PositionSample::new(center, acc));
        session
    }

    #[test]
    fn test_in_on_time_is_present() {
        let session = session_with_fix(15.);
        let mut log = MemoryLog::new();
        let gate = SubmissionGate::default();

        let rec = gate
            .submit(&session, &mut log, &teacher(), AttendanceKind::In, None, wib(7, 30))
            .unwrap();
        assert_eq!(AttendanceStatus::Present, rec.status);
        assert_eq!("07:30:00", rec.time);
        assert_eq!(15., rec.location.accuracy_m);
    }

    #[test]
    fn test_in_after_cutoff_is_late() {
        let session = session_with_fix(15.);
        let mut log = MemoryLog::new();
        let gate = SubmissionGate::default();

        let rec = gate
            .submit(&session, &mut log, &teacher(), AttendanceKind::In, None, wib(8, 5))
            .unwrap();
        assert_eq!(AttendanceStatus::Late, rec.status);
    }

    #[test]
    fn test_no_fix_blocks_located_submission() {
        let session = ScanSession::new(GeofenceConfig::new(Coordinate::new(-6.2, 106.8), 100.));
        let mut log = MemoryLog::new();
        let gate = SubmissionGate::default();

        let res = gate.submit(&session, &mut log, &teacher(), AttendanceKind::In, None, wib(7, 0));
        assert_eq!(Err(GateError::NoPosition), res.map(|_| ()));
    }

    #[test]
    fn test_outside_fix_blocks_submission() {
        let center = Coordinate::new(-6.2, 106.8);
        let mut session = ScanSession::new(GeofenceConfig::new(center, 100.));
        let token = session.start_attempt();
        // ~1.1 km north of the school, tight accuracy
        session.publish(
            &token,
            PositionSample::new(Coordinate::new(-6.19, 106.8), 10.),
        );

        let mut log = MemoryLog::new();
        let gate = SubmissionGate::default();
        let res = gate.submit(&session, &mut log, &teacher(), AttendanceKind::Out, None, wib(16, 0));
        assert!(matches!(res, Err(GateError::OutsideGeofence { .. })));
    }

    #[test]
    fn test_unconfigured_blocks_located_submission() {
        let mut session = ScanSession::new(GeofenceConfig::default());
        let token = session.start_attempt();
        session.publish(&token, PositionSample::new(Coordinate::new(-6.2, 106.8), 10.));

        let mut log = MemoryLog::new();
        let gate = SubmissionGate::default();
        let res = gate.submit(&session, &mut log, &teacher(), AttendanceKind::In, None, wib(7, 0));
        assert_eq!(Err(GateError::Unconfigured), res.map(|_| ()));
    }

    #[test]
    fn test_izin_bypasses_fence_but_needs_reason() {
        // no fix at all in the session
        let session = ScanSession::new(GeofenceConfig::new(Coordinate::new(-6.2, 106.8), 100.));
        let mut log = MemoryLog::new();
        let gate = SubmissionGate::default();

        let res = gate.submit(&session, &mut log, &teacher(), AttendanceKind::Izin, None, wib(7, 0));
        assert_eq!(
            Err(GateError::MissingReason(AttendanceKind::Izin)),
            res.map(|_| ())
        );

        let res = gate.submit(
            &session,
            &mut log,
            &teacher(),
            AttendanceKind::Izin,
            Some("  "),
            wib(7, 0),
        );
        assert!(matches!(res, Err(GateError::MissingReason(_))));

        let rec = gate
            .submit(
                &session,
                &mut log,
                &teacher(),
                AttendanceKind::Izin,
                Some("rapat dinas"),
                wib(7, 0),
            )
            .unwrap();
        assert_eq!(AttendanceStatus::Izin, rec.status);
        assert_eq!("rapat dinas", rec.note);
        assert_eq!(RecordedLocation::default(), rec.location);
    }

    #[test]
    fn test_duplicate_submission_is_rejected() {
        let session = session_with_fix(15.);
        let mut log = MemoryLog::new();
        let gate = SubmissionGate::default();

        gate.submit(&session, &mut log, &teacher(), AttendanceKind::In, None, wib(7, 0))
            .unwrap();
        let res = gate.submit(&session, &mut log, &teacher(), AttendanceKind::In, None, wib(7, 30));
        assert!(matches!(res, Err(GateError::Duplicate { .. })));

        // a different kind on the same day is fine
        gate.submit(&session, &mut log, &teacher(), AttendanceKind::Out, None, wib(16, 0))
            .unwrap();
    }

    #[test]
    fn test_kind_parsing() {
        use std::str::FromStr;
        assert_eq!(AttendanceKind::In, AttendanceKind::from_str("in").unwrap());
        assert_eq!(AttendanceKind::Izin, AttendanceKind::from_str("IZIN").unwrap());
        assert_eq!("alpha", AttendanceKind::Alpha.to_string());
    }
}
