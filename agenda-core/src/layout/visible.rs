use chrono::NaiveDateTime;
use tracing::debug;

use crate::appointment::Appointment;

/// Appointments whose `[start, end)` overlaps `[window_start, window_end)`.
///
/// Malformed appointments (end not after start) are skipped. An empty or
/// inverted window selects nothing. Input order is preserved.
pub fn select_visible<'a>(
    appointments: &'a [Appointment],
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
) -> Vec<&'a Appointment> {
    if window_end <= window_start {
        return Vec::new();
    }

    appointments
        .iter()
        .filter(|appt| {
            if !appt.is_well_formed() {
                debug!(appointment_id = appt.id, "skipping appointment that ends before it starts");
                return false;
            }
            appt.overlaps(window_start, window_end)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::{appt, dt};

    #[test]
    fn appointment_ending_at_midnight_stays_on_its_day() {
        let appointments = vec![appt(1, "2025-01-01T23:00", "2025-01-02T00:00")];
        assert!(select_visible(&appointments, dt("2025-01-02T00:00"), dt("2025-01-03T00:00")).is_empty());
        assert_eq!(
            select_visible(&appointments, dt("2025-01-01T00:00"), dt("2025-01-02T00:00")).len(),
            1
        );
    }

    #[test]
    fn appointment_starting_at_window_end_is_excluded() {
        let appointments = vec![appt(1, "2025-01-03T00:00", "2025-01-03T01:00")];
        assert!(select_visible(&appointments, dt("2025-01-02T00:00"), dt("2025-01-03T00:00")).is_empty());
    }

    #[test]
    fn overlap_rule_matches_definition() {
        let window = (dt("2025-01-02T00:00"), dt("2025-01-03T00:00"));
        let appointments = vec![
            appt(1, "2025-01-01T20:00", "2025-01-02T00:01"),
            appt(2, "2025-01-02T12:00", "2025-01-02T13:00"),
            appt(3, "2025-01-02T23:59", "2025-01-04T00:00"),
            appt(4, "2025-01-01T00:00", "2025-01-05T00:00"),
            appt(5, "2025-01-03T00:00", "2025-01-03T00:30"),
            appt(6, "2025-01-01T00:00", "2025-01-02T00:00"),
        ];
        let visible: Vec<i64> = select_visible(&appointments, window.0, window.1)
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(visible, vec![1, 2, 3, 4]);

        for a in &appointments {
            let expected = a.end > window.0 && a.start < window.1;
            assert_eq!(visible.contains(&a.id), expected, "appointment {}", a.id);
        }
    }

    #[test]
    fn malformed_records_and_bad_windows_select_nothing() {
        let appointments = vec![
            appt(1, "2025-01-02T10:00", "2025-01-02T09:00"),
            appt(2, "2025-01-02T10:00", "2025-01-02T10:00"),
        ];
        assert!(select_visible(&appointments, dt("2025-01-02T00:00"), dt("2025-01-03T00:00")).is_empty());

        let fine = vec![appt(3, "2025-01-02T10:00", "2025-01-02T11:00")];
        assert!(select_visible(&fine, dt("2025-01-03T00:00"), dt("2025-01-02T00:00")).is_empty());
        assert!(select_visible(&[], dt("2025-01-02T00:00"), dt("2025-01-03T00:00")).is_empty());
    }
}
