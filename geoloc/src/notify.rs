//! Outbound Telegram notification.
//!
//! After a record is persisted, a formatted message goes out to the school's
//! Telegram group.  Delivery failure is logged and never rolls back the
//! record.
//!

use chrono::{Datelike, NaiveDate, Weekday};
use eyre::Result;
use serde_json::json;
use tracing::{debug, warn};

use crate::AttendanceRecord;

/// Day names as used in the notification text.
///
pub fn day_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Sun => "Minggu",
        Weekday::Mon => "Senin",
        Weekday::Tue => "Selasa",
        Weekday::Wed => "Rabu",
        Weekday::Thu => "Kamis",
        Weekday::Fri => "Jumat",
        Weekday::Sat => "Sabtu",
    }
}

/// `DD-MM-YYYY`, the display format on record and in messages.
///
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Build the notification text for one record.
///
pub fn format_message(record: &AttendanceRecord) -> String {
    let mut message = format!(
        "GTK dengan nama {} telah berhasil melakukan Absensi \"{}\" pada hari ini, {} tanggal {} pukul {} WIB.",
        record.teacher_name,
        record.kind.label(),
        day_name(record.date),
        display_date(record.date),
        record.time,
    );

    if record.kind.requires_location() && record.location.accuracy_m > 0. {
        message.push_str(&format!(
            "\n📍 Akurasi Lokasi: ± {:.0}m",
            record.location.accuracy_m
        ));
    }

    if record.kind.requires_reason() && !record.note.is_empty() {
        message.push_str(&format!(
            "\nAlasan {}: \"{}\".",
            record.kind.label(),
            record.note
        ));
    }

    message
}

/// Telegram bot client for the notification sink.
///
#[derive(Clone, Debug)]
pub struct TelegramNotifier {
    token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(token: &str, chat_id: &str) -> Self {
        TelegramNotifier {
            token: token.to_string(),
            chat_id: chat_id.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("https://api.telegram.org/bot{}/sendMessage", self.token)
    }

    /// Send the message, propagating transport errors.
    ///
    #[tracing::instrument(skip(self, record))]
    pub async fn send(&self, record: &AttendanceRecord) -> Result<()> {
        let body = json!({
            "chat_id": self.chat_id,
            "text": format_message(record),
        });

        let resp = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        debug!("telegram answered {}", resp.status());
        Ok(())
    }

    /// Fire-and-forget wrapper: the record is already persisted, so a failed
    /// notification is only logged.
    ///
    pub async fn notify(&self, record: &AttendanceRecord) {
        if let Err(e) = self.send(record).await {
            warn!("telegram notification failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{AttendanceKind, AttendanceStatus, RecordedLocation};

    fn record(kind: AttendanceKind, note: &str, accuracy: f64) -> AttendanceRecord {
        AttendanceRecord {
            teacher_id: "t-1".to_string(),
            teacher_name: "Budi Santoso".to_string(),
            teacher_nik: "19870101".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 13).unwrap(),
            time: "07:12:45".to_string(),
            timestamp: Utc::now(),
            kind,
            status: AttendanceStatus::Present,
            location: RecordedLocation {
                latitude: -6.2,
                longitude: 106.8,
                accuracy_m: accuracy,
            },
            school_id: "sch-1".to_string(),
            note: note.to_string(),
        }
    }

    #[test]
    fn test_day_names() {
        // 2025-01-13 is a Monday
        assert_eq!("Senin", day_name(NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()));
        assert_eq!("Minggu", day_name(NaiveDate::from_ymd_opt(2025, 1, 12).unwrap()));
    }

    #[test]
    fn test_display_date() {
        assert_eq!(
            "13-01-2025",
            display_date(NaiveDate::from_ymd_opt(2025, 1, 13).unwrap())
        );
    }

    #[test]
    fn test_message_for_checkin_has_accuracy_line() {
        let msg = format_message(&record(AttendanceKind::In, "", 23.4));
        assert!(msg.contains("Absensi \"MASUK\""));
        assert!(msg.contains("Senin tanggal 13-01-2025 pukul 07:12:45 WIB"));
        assert!(msg.contains("Akurasi Lokasi: ± 23m"));
        assert!(!msg.contains("Alasan"));
    }

    #[test]
    fn test_message_for_izin_has_reason_line() {
        let msg = format_message(&record(AttendanceKind::Izin, "rapat dinas", 0.));
        assert!(msg.contains("Absensi \"IZIN\""));
        assert!(msg.contains("Alasan IZIN: \"rapat dinas\"."));
        assert!(!msg.contains("Akurasi"));
    }
}
