//! Appointment types.
//!
//! These are the validated, typed form of what the appointment API returns.
//! The lenient wire form lives in [`crate::record`]; the layout engine and the
//! session work exclusively with the types here.

use chrono::{Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

pub type AppointmentId = i64;
pub type UserId = i64;

/// Colour used when neither the API nor the status provides one.
pub const DEFAULT_COLOR: &str = "#3b82f6";

/// A scheduled appointment, or one materialized instance of a recurring one.
#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: AppointmentId,
    pub organizer_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: AppointmentStatus,
    /// Display colour sent by the API; wins over the status colour.
    pub status_color: Option<String>,
    pub participant_ids: Vec<UserId>,
    pub recurrence: Option<Recurrence>,
    /// Date of the occurrence this instance was materialized for.
    pub occurrence: Option<NaiveDate>,
}

impl Appointment {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Base records must end strictly after they start.
    pub fn is_well_formed(&self) -> bool {
        self.end > self.start
    }

    /// Half-open overlap with `[from, to)`.
    pub fn overlaps(&self, from: NaiveDateTime, to: NaiveDateTime) -> bool {
        self.end > from && self.start < to
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence
            .as_ref()
            .is_some_and(|r| r.frequency != Frequency::None)
    }

    pub fn color(&self) -> &str {
        self.status_color
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| self.status.color())
    }

    /// Copy of this appointment moved to a concrete occurrence start,
    /// keeping its duration and every other field.
    pub fn instance_at(&self, start: NaiveDateTime) -> Appointment {
        Appointment {
            start,
            end: start + self.duration(),
            occurrence: Some(start.date()),
            ..self.clone()
        }
    }
}

impl std::fmt::Display for Appointment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// How often a recurring appointment repeats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Some(Frequency::None),
            "daily" => Some(Frequency::Daily),
            "weekly" => Some(Frequency::Weekly),
            "monthly" => Some(Frequency::Monthly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::None => "None",
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        }
    }
}

/// Recurrence descriptor attached to a base appointment.
///
/// Instances are generated between `start` and `end` (compared by calendar
/// date, both inclusive). A missing `end` leaves the series bounded only by
/// the query window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recurrence {
    pub frequency: Frequency,
    /// Every N days/weeks/months. Zero is invalid and expands to nothing.
    pub interval: u32,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    /// Only consulted for weekly recurrences.
    pub days_of_week: Vec<Weekday>,
    /// Only consulted for monthly recurrences; empty means the base day.
    pub days_of_month: Vec<u32>,
}

impl Recurrence {
    /// Whether the descriptor can produce instances at all.
    ///
    /// Invalid descriptors are a data-entry failure caught when drafts are
    /// validated; at layout time they simply expand to nothing.
    pub fn is_valid(&self) -> bool {
        if self.frequency == Frequency::None || self.interval == 0 {
            return false;
        }
        if self.end.is_some_and(|end| end < self.start) {
            return false;
        }
        match self.frequency {
            Frequency::Weekly => !self.days_of_week.is_empty(),
            Frequency::Monthly => self.days_of_month.iter().all(|d| (1..=31).contains(d)),
            _ => true,
        }
    }
}

/// Scheduling state of an appointment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Cancelled,
    Completed,
    Other(u32),
}

impl AppointmentStatus {
    pub fn from_id(id: u32) -> Self {
        match id {
            1 => AppointmentStatus::Scheduled,
            2 => AppointmentStatus::Cancelled,
            3 => AppointmentStatus::Completed,
            other => AppointmentStatus::Other(other),
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            AppointmentStatus::Scheduled => 1,
            AppointmentStatus::Cancelled => 2,
            AppointmentStatus::Completed => 3,
            AppointmentStatus::Other(id) => *id,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Other(_) => "Unknown",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => DEFAULT_COLOR,
            AppointmentStatus::Cancelled => "#ef4444",
            AppointmentStatus::Completed => "#22c55e",
            AppointmentStatus::Other(_) => "#6b7280",
        }
    }
}

impl From<u32> for AppointmentStatus {
    fn from(id: u32) -> Self {
        AppointmentStatus::from_id(id)
    }
}

impl From<AppointmentStatus> for u32 {
    fn from(status: AppointmentStatus) -> Self {
        status.id()
    }
}

/// An entry of the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "userId")]
    pub id: UserId,
    #[serde(rename = "fullName")]
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
    }

    fn sample() -> Appointment {
        Appointment {
            id: 7,
            organizer_id: 1,
            title: "Standup".into(),
            description: None,
            location: Some("Room 4".into()),
            meeting_link: None,
            start: dt("2025-01-06T10:00"),
            end: dt("2025-01-06T11:00"),
            status: AppointmentStatus::Scheduled,
            status_color: None,
            participant_ids: vec![2, 3],
            recurrence: None,
            occurrence: None,
        }
    }

    #[test]
    fn overlap_is_half_open() {
        let appt = sample();
        assert!(appt.overlaps(dt("2025-01-06T10:59"), dt("2025-01-06T12:00")));
        assert!(!appt.overlaps(dt("2025-01-06T11:00"), dt("2025-01-06T12:00")));
        assert!(!appt.overlaps(dt("2025-01-06T09:00"), dt("2025-01-06T10:00")));
    }

    #[test]
    fn instance_keeps_duration_and_fields() {
        let appt = sample();
        let inst = appt.instance_at(dt("2025-01-08T10:00"));
        assert_eq!(inst.end, dt("2025-01-08T11:00"));
        assert_eq!(inst.occurrence, NaiveDate::from_ymd_opt(2025, 1, 8));
        assert_eq!(inst.location, appt.location);
        assert_eq!(inst.participant_ids, appt.participant_ids);
    }

    #[test]
    fn api_color_wins_over_status() {
        let mut appt = sample();
        assert_eq!(appt.color(), DEFAULT_COLOR);
        appt.status = AppointmentStatus::Cancelled;
        assert_eq!(appt.color(), "#ef4444");
        appt.status_color = Some("#123456".into());
        assert_eq!(appt.color(), "#123456");
    }

    #[test]
    fn frequency_parse_is_case_insensitive() {
        assert_eq!(Frequency::parse("Weekly"), Some(Frequency::Weekly));
        assert_eq!(Frequency::parse("monthly"), Some(Frequency::Monthly));
        assert_eq!(Frequency::parse(""), Some(Frequency::None));
        assert_eq!(Frequency::parse("yearly"), None);
    }

    #[test]
    fn invalid_descriptors() {
        let base = Recurrence {
            frequency: Frequency::Weekly,
            interval: 1,
            start: dt("2025-01-06T10:00"),
            end: Some(dt("2025-01-20T11:00")),
            days_of_week: vec![Weekday::Mon],
            days_of_month: vec![],
        };
        assert!(base.is_valid());
        assert!(!Recurrence { days_of_week: vec![], ..base.clone() }.is_valid());
        assert!(!Recurrence { interval: 0, ..base.clone() }.is_valid());
        assert!(!Recurrence { end: Some(dt("2025-01-01T00:00")), ..base.clone() }.is_valid());
        assert!(!Recurrence { frequency: Frequency::Monthly, days_of_month: vec![32], ..base }.is_valid());
    }

    #[test]
    fn status_ids_round_trip() {
        for id in [1, 2, 3, 9] {
            assert_eq!(AppointmentStatus::from_id(id).id(), id);
        }
    }
}
