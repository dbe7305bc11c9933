//! Month grid layout.
//!
//! The grid runs whole weeks, from the week holding the 1st to the week
//! holding the last day of the month. Each week row is packed on its own:
//! appointments overlapping the week are clipped to it, turned into a
//! `start_column..=end_column` span, and placed first-fit in the lowest row
//! whose spans they do not intersect, in input order. Rows at or beyond
//! `max_visible_rows` are not drawn; they count towards the week's
//! "+N more" indicator instead.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use tracing::debug;

use super::{LayoutBlock, Placement, first_fit, select_visible};
use crate::appointment::{Appointment, AppointmentId};
use crate::config::LayoutConfig;
use crate::time::{last_covered_date, start_of_day};
use crate::window::ViewWindow;

/// Appointments that did not fit into a week row's visible rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekOverflow {
    pub week: usize,
    pub week_start: NaiveDate,
    /// Hidden appointments in this week row.
    pub hidden: usize,
    /// Hidden appointments touching each day column, for per-day indicators.
    pub hidden_per_day: [usize; 7],
    pub hidden_ids: Vec<AppointmentId>,
}

/// Positioned bars plus overflow counts for a month grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthLayout<'a> {
    /// First day of the month being shown.
    pub month: NaiveDate,
    pub grid_start: NaiveDate,
    pub weeks: usize,
    pub blocks: Vec<LayoutBlock<'a>>,
    /// One entry per week row, in order.
    pub overflow: Vec<WeekOverflow>,
}

impl MonthLayout<'_> {
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.grid_start.iter_days().take(self.weeks * 7)
    }

    /// False for the leading/trailing days borrowed from adjacent months.
    pub fn in_month(&self, date: NaiveDate) -> bool {
        date.year() == self.month.year() && date.month() == self.month.month()
    }

    pub fn hidden_in_week(&self, week: usize) -> usize {
        self.overflow.get(week).map_or(0, |o| o.hidden)
    }

    pub fn blocks_in_week(&self, week: usize) -> impl Iterator<Item = &LayoutBlock<'_>> + '_ {
        self.blocks.iter().filter(move |b| {
            matches!(b.placement, Placement::MonthBar { week: w, .. } if w == week)
        })
    }
}

pub(super) fn layout_month<'a>(
    config: &LayoutConfig,
    month: NaiveDate,
    appointments: &'a [Appointment],
) -> MonthLayout<'a> {
    let grid = ViewWindow::month_grid(month, config.week_start);
    let grid_start = grid.start_date();
    let weeks = grid.days().len() / 7;

    let mut blocks = Vec::new();
    let mut overflow = Vec::with_capacity(weeks);

    for week in 0..weeks {
        let week_start = grid_start + Duration::days(7 * week as i64);
        let (week_blocks, week_overflow) =
            layout_week_row(config, week, week_start, appointments);
        blocks.extend(week_blocks);
        overflow.push(week_overflow);
    }

    debug!(
        month = %month,
        placed = blocks.len(),
        hidden = overflow.iter().map(|o| o.hidden).sum::<usize>(),
        "month layout"
    );

    MonthLayout {
        month: month.with_day(1).unwrap_or(month),
        grid_start,
        weeks,
        blocks,
        overflow,
    }
}

fn layout_week_row<'a>(
    config: &LayoutConfig,
    week: usize,
    week_start: NaiveDate,
    appointments: &'a [Appointment],
) -> (Vec<LayoutBlock<'a>>, WeekOverflow) {
    let from = start_of_day(week_start);
    let to = from + Duration::days(7);

    let mut rows: Vec<Vec<(usize, usize)>> = Vec::new();
    let mut blocks = Vec::new();
    let mut overflow = WeekOverflow {
        week,
        week_start,
        ..Default::default()
    };

    for appt in select_visible(appointments, from, to) {
        let visible_start = appt.start.max(from);
        let visible_end = appt.end.min(to);
        let start_column = column_of(week_start, visible_start.date());
        let end_column = column_of(week_start, last_covered_date(visible_start, visible_end));

        let row = first_fit(&mut rows, (start_column, end_column), |placed, new| {
            placed.0 <= new.1 && placed.1 >= new.0
        });

        if row < config.max_visible_rows {
            blocks.push(LayoutBlock {
                appointment: appt,
                visible_start,
                visible_end,
                column: start_column,
                row,
                clipped: appt.start < from || appt.end > to,
                placement: Placement::MonthBar {
                    week,
                    start_column,
                    end_column,
                },
            });
        } else {
            overflow.hidden += 1;
            overflow.hidden_ids.push(appt.id);
            for day in &mut overflow.hidden_per_day[start_column..=end_column] {
                *day += 1;
            }
        }
    }

    (blocks, overflow)
}

fn column_of(week_start: NaiveDate, date: NaiveDate) -> usize {
    (date - week_start).num_days().clamp(0, 6) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutEngine;
    use crate::layout::test_support::appt;
    use chrono::Weekday;

    fn engine(max_visible_rows: usize) -> LayoutEngine {
        LayoutEngine::new(LayoutConfig {
            max_visible_rows,
            ..Default::default()
        })
        .unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn span(block: &LayoutBlock<'_>) -> (usize, usize, usize) {
        match block.placement {
            Placement::MonthBar {
                week,
                start_column,
                end_column,
            } => (week, start_column, end_column),
            _ => panic!("expected a month bar"),
        }
    }

    // January 2025 with Sunday weeks: grid Dec 29 .. Feb 1, five rows.
    // Week 1 runs Sun Jan 5 .. Sat Jan 11.

    #[test]
    fn grid_covers_whole_weeks_with_adjacent_days() {
        let layout = engine(3).layout_month(date("2025-01-15"), &[]);
        assert_eq!(layout.month, date("2025-01-01"));
        assert_eq!(layout.grid_start, date("2024-12-29"));
        assert_eq!(layout.weeks, 5);
        let days: Vec<NaiveDate> = layout.days().collect();
        assert_eq!(days.len(), 35);
        assert_eq!(days.last(), Some(&date("2025-02-01")));
        assert!(!layout.in_month(date("2024-12-31")));
        assert!(layout.in_month(date("2025-01-31")));
        assert!(!layout.in_month(date("2025-02-01")));
        assert_eq!(layout.overflow.len(), 5);
    }

    #[test]
    fn first_fit_rows_follow_input_order() {
        let appointments = vec![
            appt(1, "2025-01-05T09:00", "2025-01-06T10:00"),
            appt(2, "2025-01-06T09:00", "2025-01-07T10:00"),
            appt(3, "2025-01-08T09:00", "2025-01-09T10:00"),
        ];
        let layout = engine(3).layout_month(date("2025-01-01"), &appointments);
        let placed: Vec<(i64, usize, (usize, usize, usize))> = layout
            .blocks
            .iter()
            .map(|b| (b.appointment.id, b.row, span(b)))
            .collect();
        assert_eq!(
            placed,
            vec![(1, 0, (1, 0, 1)), (2, 1, (1, 1, 2)), (3, 0, (1, 3, 4))]
        );
    }

    #[test]
    fn rows_beyond_budget_are_counted_not_placed() {
        let appointments: Vec<Appointment> = (1..=5)
            .map(|id| appt(id, "2025-01-07T09:00", "2025-01-07T10:00"))
            .collect();
        let layout = engine(3).layout_month(date("2025-01-01"), &appointments);

        assert_eq!(layout.blocks.len(), 3);
        assert_eq!(layout.blocks.iter().map(|b| b.row).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(layout.hidden_in_week(1), 2);
        assert_eq!(layout.overflow[1].hidden_ids, vec![4, 5]);
        assert_eq!(layout.overflow[1].hidden_per_day, [0, 0, 2, 0, 0, 0, 0]);
        assert_eq!(layout.hidden_in_week(0), 0);
    }

    #[test]
    fn hidden_bar_counts_on_every_day_it_touches() {
        let appointments = vec![
            appt(1, "2025-01-06T09:00", "2025-01-06T10:00"),
            appt(2, "2025-01-06T11:00", "2025-01-06T12:00"),
            // Lands in row 2, past a two-row budget.
            appt(3, "2025-01-06T13:00", "2025-01-07T12:00"),
            appt(4, "2025-01-07T13:00", "2025-01-07T14:00"),
        ];
        let layout = engine(2).layout_month(date("2025-01-01"), &appointments);
        let rows: Vec<(i64, usize)> = layout.blocks.iter().map(|b| (b.appointment.id, b.row)).collect();
        assert_eq!(rows, vec![(1, 0), (2, 1), (4, 0)]);
        assert_eq!(layout.overflow[1].hidden_ids, vec![3]);
        assert_eq!(layout.overflow[1].hidden_per_day, [0, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn multi_week_appointment_is_clipped_per_week() {
        // Fri Jan 10 .. Tue Jan 14 crosses the Sat/Sun boundary.
        let appointments = vec![appt(1, "2025-01-10T09:00", "2025-01-14T17:00")];
        let layout = engine(3).layout_month(date("2025-01-01"), &appointments);

        assert_eq!(layout.blocks.len(), 2);
        assert_eq!(span(&layout.blocks[0]), (1, 5, 6));
        assert_eq!(span(&layout.blocks[1]), (2, 0, 2));
        assert!(layout.blocks.iter().all(|b| b.clipped));
        assert_eq!(layout.blocks_in_week(2).count(), 1);
    }

    #[test]
    fn bar_ending_at_midnight_does_not_spill_into_next_column() {
        let appointments = vec![appt(1, "2025-01-06T20:00", "2025-01-07T00:00")];
        let layout = engine(3).layout_month(date("2025-01-01"), &appointments);
        assert_eq!(span(&layout.blocks[0]), (1, 1, 1));
    }

    #[test]
    fn month_overflows_independently_in_each_week() {
        let mut appointments: Vec<Appointment> = (1..=3)
            .map(|id| appt(id, "2025-01-11T09:00", "2025-01-11T10:00"))
            .collect();
        appointments.push(appt(4, "2025-01-11T12:00", "2025-01-12T10:00"));
        let layout = engine(3).layout_month(date("2025-01-01"), &appointments);

        // Saturday is crowded, so the spanning bar hides in week 1 but shows in week 2.
        assert_eq!(layout.hidden_in_week(1), 1);
        assert_eq!(layout.hidden_in_week(2), 0);
        assert_eq!(layout.blocks_in_week(2).map(|b| b.row).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn monday_weeks_shift_the_grid() {
        let appointments = [appt(1, "2025-01-05T09:00", "2025-01-05T10:00")];
        let layout = LayoutEngine::new(LayoutConfig {
            week_start: Weekday::Mon,
            ..Default::default()
        })
        .unwrap()
        .layout_month(date("2025-01-01"), &appointments);
        assert_eq!(layout.grid_start, date("2024-12-30"));
        // Sunday is the last column of the first row.
        assert_eq!(span(&layout.blocks[0]), (0, 6, 6));
    }
}
