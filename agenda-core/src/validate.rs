//! Appointment drafts and the checks they pass before reaching the API.
//!
//! Invalid recurrence descriptors are rejected here, at creation time. The
//! layout engine never sees them as errors.

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::appointment::{AppointmentId, AppointmentStatus, Frequency, Recurrence, UserId};
use crate::error::{AgendaError, AgendaResult, FieldError};
use crate::record::AppointmentRecord;
use crate::time::{format_timestamp, weekday_name};

/// What create and update submit.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDraft {
    pub organizer_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: AppointmentStatus,
    pub participant_ids: Vec<UserId>,
    pub recurrence: Option<Recurrence>,
}

impl AppointmentDraft {
    /// A one-off draft with status Scheduled.
    pub fn new(
        organizer_id: UserId,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        AppointmentDraft {
            organizer_id,
            title: title.into(),
            description: None,
            location: None,
            meeting_link: None,
            start,
            end,
            status: AppointmentStatus::Scheduled,
            participant_ids: Vec::new(),
            recurrence: None,
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence
            .as_ref()
            .is_some_and(|r| r.frequency != Frequency::None)
    }

    /// Check every field, reporting all problems at once.
    pub fn validate(&self) -> AgendaResult<()> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Title is required."));
        }
        if self.end <= self.start {
            errors.push(FieldError::new("endTime", "End must be after start."));
        }
        if self.participant_ids.is_empty() {
            errors.push(FieldError::new("participantIds", "Select at least one participant."));
        }

        if let Some(rec) = self.recurrence.as_ref().filter(|r| r.frequency != Frequency::None) {
            self.validate_recurrence(rec, &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AgendaError::Validation(errors))
        }
    }

    fn validate_recurrence(&self, rec: &Recurrence, errors: &mut Vec<FieldError>) {
        if rec.interval < 1 {
            errors.push(FieldError::new("interval", "Interval must be at least 1."));
        }
        if rec.start > self.start {
            errors.push(FieldError::new(
                "recurrenceStartDate",
                "Recurrence must start no later than the appointment.",
            ));
        }
        if let Some(end) = rec.end {
            if end <= rec.start {
                errors.push(FieldError::new(
                    "recurrenceEndDate",
                    "Recurrence end must be after recurrence start.",
                ));
            } else if end < self.end {
                errors.push(FieldError::new(
                    "recurrenceEndDate",
                    "Recurrence must not end before the appointment does.",
                ));
            }
        }
        match rec.frequency {
            Frequency::Weekly if rec.days_of_week.is_empty() => errors.push(FieldError::new(
                "daysOfWeek",
                "Pick at least one day for weekly recurrence.",
            )),
            Frequency::Monthly if rec.days_of_month.iter().any(|d| !(1..=31).contains(d)) => {
                errors.push(FieldError::new(
                    "daysOfMonth",
                    "Days of the month must be between 1 and 31.",
                ))
            }
            _ => {}
        }
    }

    /// Wire record for `POST /appointment/create`.
    ///
    /// Non-recurring drafts send `frequency: "None"` with null recurrence
    /// bounds; day lists are only sent for the frequency that uses them.
    pub fn to_record(&self) -> AppointmentRecord {
        let rec = self.recurrence.as_ref().filter(|r| r.frequency != Frequency::None);
        let frequency = rec.map(|r| r.frequency).unwrap_or_default();

        AppointmentRecord {
            appointment_id: None,
            organizer_id: Some(self.organizer_id),
            title: Some(self.title.trim().to_string()),
            description: trimmed(&self.description),
            location: trimmed(&self.location),
            meeting_link: trimmed(&self.meeting_link),
            start_time: Some(format_timestamp(&self.start)),
            end_time: Some(format_timestamp(&self.end)),
            status_id: Some(self.status.id()),
            status_color: None,
            participant_ids: Some(self.participant_ids.clone()),
            frequency: Some(frequency.as_str().to_string()),
            interval: Some(rec.map_or(1, |r| i64::from(r.interval))),
            recurrence_start_date: rec.map(|r| format_timestamp(&r.start)),
            recurrence_end_date: rec.and_then(|r| r.end.as_ref().map(format_timestamp)),
            days_of_week: Some(match rec {
                Some(r) if frequency == Frequency::Weekly => r
                    .days_of_week
                    .iter()
                    .map(|d| weekday_name(*d).to_string())
                    .collect(),
                _ => Vec::new(),
            }),
            days_of_month: Some(match rec {
                Some(r) if frequency == Frequency::Monthly => {
                    r.days_of_month.iter().map(|d| i64::from(*d)).collect()
                }
                _ => Vec::new(),
            }),
        }
    }

    /// JSON body for `PUT /appointment/update`.
    ///
    /// Nulls and empty arrays are left out so the server keeps what it has.
    pub fn into_update(self, id: AppointmentId) -> AgendaResult<Value> {
        let mut record = self.to_record();
        record.appointment_id = Some(id);

        let value =
            serde_json::to_value(&record).map_err(|e| AgendaError::Serialization(e.to_string()))?;
        let Value::Object(fields) = value else {
            return Err(AgendaError::Serialization("record is not an object".into()));
        };

        let kept: Map<String, Value> = fields
            .into_iter()
            .filter(|(_, v)| match v {
                Value::Null => false,
                Value::Array(items) => !items.is_empty(),
                _ => true,
            })
            .collect();
        Ok(Value::Object(kept))
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
