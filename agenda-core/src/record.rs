//! Wire form of appointments and conversion to typed [`Appointment`]s.
//!
//! The API sends a flat JSON object per appointment with the recurrence
//! descriptor inlined. Records are decoded leniently so that one bad entry
//! never takes the rest of the list down with it: [`sanitize`] drops
//! malformed records, logs why, and reports them back to the caller.

use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::appointment::{
    Appointment, AppointmentId, AppointmentStatus, Frequency, Recurrence, UserId,
};
use crate::error::{AgendaError, AgendaResult};
use crate::time::{format_timestamp, parse_timestamp, weekday_name};

/// One appointment exactly as the API serializes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    pub appointment_id: Option<AppointmentId>,
    pub organizer_id: Option<UserId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status_id: Option<u32>,
    pub status_color: Option<String>,
    #[serde(alias = "participants")]
    pub participant_ids: Option<Vec<UserId>>,
    pub frequency: Option<String>,
    pub interval: Option<i64>,
    pub recurrence_start_date: Option<String>,
    pub recurrence_end_date: Option<String>,
    pub days_of_week: Option<Vec<String>>,
    pub days_of_month: Option<Vec<i64>>,
}

/// Why a record was excluded from the appointment snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Undecodable(String),
    MissingId,
    MissingTimestamp(&'static str),
    InvalidTimestamp { field: &'static str, value: String },
    EndNotAfterStart,
    UnknownFrequency(String),
    UnknownWeekday(String),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Undecodable(e) => write!(f, "undecodable record: {e}"),
            RejectReason::MissingId => write!(f, "missing appointmentId"),
            RejectReason::MissingTimestamp(field) => write!(f, "missing {field}"),
            RejectReason::InvalidTimestamp { field, value } => {
                write!(f, "invalid {field} '{value}'")
            }
            RejectReason::EndNotAfterStart => write!(f, "endTime is not after startTime"),
            RejectReason::UnknownFrequency(s) => write!(f, "unknown frequency '{s}'"),
            RejectReason::UnknownWeekday(s) => write!(f, "unknown weekday '{s}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub appointment_id: Option<AppointmentId>,
    pub reason: RejectReason,
}

/// Outcome of turning raw records into appointments.
#[derive(Debug, Clone, Default)]
pub struct SanitizeReport {
    pub accepted: Vec<Appointment>,
    pub rejected: Vec<Rejection>,
}

impl SanitizeReport {
    pub fn into_appointments(self) -> Vec<Appointment> {
        self.accepted
    }
}

/// Convert records to appointments, dropping (and logging) malformed ones.
pub fn sanitize(records: impl IntoIterator<Item = AppointmentRecord>) -> SanitizeReport {
    let mut report = SanitizeReport::default();
    for record in records {
        let id = record.appointment_id;
        match Appointment::try_from(record) {
            Ok(appt) => report.accepted.push(appt),
            Err(reason) => {
                warn!(appointment_id = ?id, %reason, "excluding malformed appointment record");
                report.rejected.push(Rejection {
                    appointment_id: id,
                    reason,
                });
            }
        }
    }
    report
}

/// Decode a JSON array of appointment records one element at a time.
///
/// Only a body that is not a JSON array at all is an error; elements that
/// fail to decode are reported as rejections.
pub fn parse_records(json: &str) -> AgendaResult<SanitizeReport> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| AgendaError::Serialization(e.to_string()))?;

    let mut undecodable = Vec::new();
    let records: Vec<AppointmentRecord> = values
        .into_iter()
        .filter_map(|value| {
            let id = value.get("appointmentId").and_then(|v| v.as_i64());
            match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(appointment_id = ?id, error = %e, "excluding undecodable appointment record");
                    undecodable.push(Rejection {
                        appointment_id: id,
                        reason: RejectReason::Undecodable(e.to_string()),
                    });
                    None
                }
            }
        })
        .collect();

    let mut report = sanitize(records);
    report.rejected.extend(undecodable);
    Ok(report)
}

fn required_timestamp(
    value: Option<&str>,
    field: &'static str,
) -> Result<NaiveDateTime, RejectReason> {
    let value = value.ok_or(RejectReason::MissingTimestamp(field))?;
    parse_timestamp(value).ok_or_else(|| RejectReason::InvalidTimestamp {
        field,
        value: value.to_string(),
    })
}

fn optional_timestamp(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<NaiveDateTime>, RejectReason> {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(v) => required_timestamp(Some(v), field).map(Some),
        None => Ok(None),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<AppointmentRecord> for Appointment {
    type Error = RejectReason;

    fn try_from(record: AppointmentRecord) -> Result<Self, Self::Error> {
        let id = record.appointment_id.ok_or(RejectReason::MissingId)?;
        let start = required_timestamp(record.start_time.as_deref(), "startTime")?;
        let end = required_timestamp(record.end_time.as_deref(), "endTime")?;
        if end <= start {
            return Err(RejectReason::EndNotAfterStart);
        }

        let frequency = match record.frequency.as_deref() {
            Some(s) => Frequency::parse(s).ok_or_else(|| RejectReason::UnknownFrequency(s.into()))?,
            None => Frequency::None,
        };

        let recurrence = if frequency == Frequency::None {
            None
        } else {
            let rec_start =
                optional_timestamp(record.recurrence_start_date.as_deref(), "recurrenceStartDate")?;
            let rec_end =
                optional_timestamp(record.recurrence_end_date.as_deref(), "recurrenceEndDate")?;

            let days_of_week = record
                .days_of_week
                .unwrap_or_default()
                .iter()
                .map(|name| {
                    name.trim()
                        .parse::<Weekday>()
                        .map_err(|_| RejectReason::UnknownWeekday(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;

            // Out-of-range values are kept as 0 so the descriptor reads as invalid.
            let days_of_month = record
                .days_of_month
                .unwrap_or_default()
                .into_iter()
                .map(|d| u32::try_from(d).unwrap_or(0))
                .collect();

            Some(Recurrence {
                frequency,
                interval: record
                    .interval
                    .map(|n| u32::try_from(n).unwrap_or(0))
                    .unwrap_or(1),
                start: rec_start.unwrap_or(start),
                end: rec_end,
                days_of_week,
                days_of_month,
            })
        };

        Ok(Appointment {
            id,
            organizer_id: record.organizer_id.unwrap_or_default(),
            title: record.title.unwrap_or_default(),
            description: non_empty(record.description),
            location: non_empty(record.location),
            meeting_link: non_empty(record.meeting_link),
            start,
            end,
            status: record
                .status_id
                .map(AppointmentStatus::from_id)
                .unwrap_or_default(),
            status_color: non_empty(record.status_color),
            participant_ids: record.participant_ids.unwrap_or_default(),
            recurrence,
            occurrence: None,
        })
    }
}

impl From<&Appointment> for AppointmentRecord {
    fn from(appt: &Appointment) -> Self {
        let rec = appt.recurrence.as_ref();
        AppointmentRecord {
            appointment_id: Some(appt.id),
            organizer_id: Some(appt.organizer_id),
            title: Some(appt.title.clone()),
            description: appt.description.clone(),
            location: appt.location.clone(),
            meeting_link: appt.meeting_link.clone(),
            start_time: Some(format_timestamp(&appt.start)),
            end_time: Some(format_timestamp(&appt.end)),
            status_id: Some(appt.status.id()),
            status_color: appt.status_color.clone(),
            participant_ids: Some(appt.participant_ids.clone()),
            frequency: Some(
                rec.map(|r| r.frequency)
                    .unwrap_or_default()
                    .as_str()
                    .to_string(),
            ),
            interval: rec.map(|r| i64::from(r.interval)),
            recurrence_start_date: rec.map(|r| format_timestamp(&r.start)),
            recurrence_end_date: rec.and_then(|r| r.end.as_ref().map(format_timestamp)),
            days_of_week: rec.map(|r| {
                r.days_of_week
                    .iter()
                    .map(|d| weekday_name(*d).to_string())
                    .collect()
            }),
            days_of_month: rec.map(|r| r.days_of_month.iter().map(|d| i64::from(*d)).collect()),
        }
    }
}
