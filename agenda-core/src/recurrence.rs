//! Recurrence expansion.
//!
//! Expands a base appointment into the concrete instances that overlap a
//! query window. Expansion is pure: the base appointment is only read, and
//! each instance is a copy moved to its occurrence start with the base
//! duration preserved.
//!
//! Stepping rules:
//! - Daily: every `interval` days from the base start date.
//! - Weekly: 7-day blocks anchored at the recurrence start date (not the
//!   calendar's week-start convention); every `interval`-th block is active
//!   and contributes each of its days listed in `days_of_week`.
//! - Monthly: every `interval` months from the base start month, on each of
//!   `days_of_month` (or the base day when empty). Months lacking that day
//!   are skipped.
//!
//! Occurrences never precede the base start, and are bounded by the
//! recurrence start/end dates (inclusive, compared by date).

use std::collections::HashSet;
use std::ops::ControlFlow;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::appointment::{Appointment, Frequency, Recurrence};
use crate::time::last_covered_date;

/// Upper bound on instances produced for one appointment and window.
const MAX_INSTANCES: usize = 1000;

/// Expand `appt` into the instances overlapping `[window_start, window_end)`.
///
/// Non-recurring appointments come back as themselves when they overlap the
/// window. Malformed appointments and invalid descriptors expand to nothing.
pub fn expand_recurrence(
    appt: &Appointment,
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
) -> Vec<Appointment> {
    if window_end <= window_start || !appt.is_well_formed() {
        return Vec::new();
    }

    let rec = match &appt.recurrence {
        Some(rec) if rec.frequency != Frequency::None => rec,
        _ => {
            return if appt.overlaps(window_start, window_end) {
                vec![appt.clone()]
            } else {
                Vec::new()
            };
        }
    };

    if !rec.is_valid() {
        warn!(appointment_id = appt.id, "invalid recurrence descriptor; expanding to nothing");
        return Vec::new();
    }

    let duration = appt.duration();
    let time_of_day = appt.start.time();

    // Instances starting before this date cannot reach the window.
    let earliest = (window_start - duration).date();
    let first = appt.start.date().max(rec.start.date());
    let mut last = last_covered_date(window_start, window_end);
    if let Some(end) = rec.end {
        last = last.min(end.date());
    }
    if last < first {
        return Vec::new();
    }

    let mut instances = Vec::new();
    for_each_occurrence(appt, rec, earliest.max(first), last, |date| {
        let inst = appt.instance_at(date.and_time(time_of_day));
        if inst.overlaps(window_start, window_end) {
            instances.push(inst);
            if instances.len() == MAX_INSTANCES {
                warn!(appointment_id = appt.id, "recurrence expansion capped at {MAX_INSTANCES} instances");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    });
    instances
}

/// Expand every appointment and drop duplicate instances.
///
/// Duplicates are keyed by `(id, start)`, so a backend that already returns
/// expanded instances yields the same set as one returning only base records.
/// Input order is preserved.
pub fn expand_all(
    appointments: &[Appointment],
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
) -> Vec<Appointment> {
    let mut seen = HashSet::new();
    appointments
        .iter()
        .flat_map(|appt| expand_recurrence(appt, window_start, window_end))
        .filter(|inst| seen.insert((inst.id, inst.start)))
        .collect()
}

/// Visit candidate occurrence dates in `[from, to]` in ascending order,
/// stopping as soon as `visit` breaks.
fn for_each_occurrence(
    appt: &Appointment,
    rec: &Recurrence,
    from: NaiveDate,
    to: NaiveDate,
    mut visit: impl FnMut(NaiveDate) -> ControlFlow<()>,
) {
    let interval = i64::from(rec.interval);

    match rec.frequency {
        Frequency::None => {}
        Frequency::Daily => {
            let anchor = appt.start.date();
            let skip = (from - anchor).num_days().max(0);
            let mut k = skip / interval;
            loop {
                let date = anchor + Duration::days(k * interval);
                if date > to {
                    return;
                }
                if date >= from && visit(date).is_break() {
                    return;
                }
                k += 1;
            }
        }
        Frequency::Weekly => {
            let anchor = rec.start.date();
            let first_block = (from - anchor).num_days().max(0) / 7;
            let mut block = first_block - first_block % interval;
            loop {
                let block_start = anchor + Duration::days(block * 7);
                if block_start > to {
                    return;
                }
                for offset in 0..7 {
                    let date = block_start + Duration::days(offset);
                    if date < from || date > to || !rec.days_of_week.contains(&date.weekday()) {
                        continue;
                    }
                    if visit(date).is_break() {
                        return;
                    }
                }
                block += interval;
            }
        }
        Frequency::Monthly => {
            let anchor = appt.start.date().with_day(1).unwrap_or(appt.start.date());
            let mut days: Vec<u32> = if rec.days_of_month.is_empty() {
                vec![appt.start.day()]
            } else {
                rec.days_of_month.clone()
            };
            days.sort_unstable();
            days.dedup();

            let months_to_from = months_between(anchor, from).max(0);
            let mut k = months_to_from / interval;
            loop {
                let Some(month_start) = u32::try_from(k * interval)
                    .ok()
                    .and_then(|m| anchor.checked_add_months(Months::new(m)))
                else {
                    return;
                };
                if month_start > to {
                    return;
                }
                for date in days.iter().filter_map(|d| month_start.with_day(*d)) {
                    if date < from || date > to {
                        continue;
                    }
                    if visit(date).is_break() {
                        return;
                    }
                }
                k += 1;
            }
        }
    }
}

fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month())
}
