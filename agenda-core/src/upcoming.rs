use chrono::NaiveDateTime;
use serde::Serialize;

use crate::appointment::{Appointment, UserId};

/// Length of the upcoming list when the caller does not ask for another.
pub const DEFAULT_UPCOMING_LIMIT: usize = 10;

/// Appointments that have not ended by `now`, soonest first.
///
/// Ties keep input order.
pub fn upcoming(appointments: &[Appointment], now: NaiveDateTime, limit: usize) -> Vec<&Appointment> {
    let mut pending: Vec<&Appointment> = appointments.iter().filter(|a| a.end > now).collect();
    pending.sort_by_key(|a| a.start);
    pending.truncate(limit);
    pending
}

/// What the current user may do with an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    Edit,
    View,
}

impl AccessMode {
    /// Organizers edit their appointments; everyone else only views them.
    pub fn for_user(user: Option<UserId>, appointment: &Appointment) -> Self {
        if user == Some(appointment.organizer_id) {
            AccessMode::Edit
        } else {
            AccessMode::View
        }
    }

    pub fn can_edit(&self) -> bool {
        *self == AccessMode::Edit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::{appt, dt};

    #[test]
    fn skips_finished_and_sorts_by_start() {
        let appointments = vec![
            appt(1, "2025-01-06T15:00", "2025-01-06T16:00"),
            appt(2, "2025-01-06T08:00", "2025-01-06T09:00"),
            appt(3, "2025-01-06T09:30", "2025-01-06T10:30"),
            appt(4, "2025-01-06T09:30", "2025-01-06T11:00"),
            appt(5, "2025-01-06T10:00", "2025-01-06T10:00"),
        ];
        let ids: Vec<i64> = upcoming(&appointments, dt("2025-01-06T10:00"), DEFAULT_UPCOMING_LIMIT)
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![3, 4, 1]);
    }

    #[test]
    fn truncates_to_limit() {
        let appointments: Vec<Appointment> = (1..=12)
            .map(|id| appt(id, "2025-01-07T09:00", "2025-01-07T10:00"))
            .collect();
        let list = upcoming(&appointments, dt("2025-01-06T00:00"), DEFAULT_UPCOMING_LIMIT);
        assert_eq!(list.len(), 10);
        assert_eq!(list[9].id, 10);
        assert!(upcoming(&appointments, dt("2025-01-06T00:00"), 0).is_empty());
    }

    #[test]
    fn only_the_organizer_edits() {
        let a = appt(1, "2025-01-06T09:00", "2025-01-06T10:00");
        assert_eq!(AccessMode::for_user(Some(1), &a), AccessMode::Edit);
        assert_eq!(AccessMode::for_user(Some(2), &a), AccessMode::View);
        assert!(!AccessMode::for_user(None, &a).can_edit());
    }
}
