//! Calendar layout engine.
//!
//! Turns an appointment snapshot into positioned [`LayoutBlock`]s for the
//! day, week and month views. Everything here is a pure function of its
//! inputs: appointments are borrowed, never mutated, and no state survives
//! between calls.
//!
//! | View | Function | Placement |
//! |------|----------|-----------|
//! | Day | [`LayoutEngine::layout_day`] | vertical offset/height in one column |
//! | Week | [`LayoutEngine::layout_week`] | same, one column per day |
//! | Month | [`LayoutEngine::layout_month`] | horizontal bars packed into rows |

mod month;
mod timegrid;
mod visible;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::appointment::Appointment;
use crate::config::LayoutConfig;
use crate::error::AgendaResult;

pub use month::{MonthLayout, WeekOverflow};
pub use visible::select_visible;

/// Where a block sits within its view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Placement {
    /// Day/week time grid. `lane` of `lanes` splits the column width among
    /// blocks that overlap in time.
    TimeGrid {
        top: f64,
        height: f64,
        lane: usize,
        lanes: usize,
    },
    /// Month bar spanning `start_column..=end_column` of week row `week`.
    MonthBar {
        week: usize,
        start_column: usize,
        end_column: usize,
    },
}

/// One appointment instance positioned within one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutBlock<'a> {
    #[serde(rename = "appointmentId", serialize_with = "serialize_appointment_ref")]
    pub appointment: &'a Appointment,
    #[serde(with = "crate::time::serde_timestamp")]
    pub visible_start: NaiveDateTime,
    #[serde(with = "crate::time::serde_timestamp")]
    pub visible_end: NaiveDateTime,
    /// Day column in week view (0 in day view); first covered column in month view.
    pub column: usize,
    /// Packing row in month view; lane in day/week view.
    pub row: usize,
    /// True when the appointment extends beyond what this block shows.
    pub clipped: bool,
    pub placement: Placement,
}

fn serialize_appointment_ref<S: serde::Serializer>(
    appt: &&Appointment,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(appt.id)
}

/// Greedy first-fit: place `item` in the lowest row holding nothing that
/// conflicts with it, opening a new row when none fits. Returns the row.
fn first_fit<T>(rows: &mut Vec<Vec<T>>, item: T, conflicts: impl Fn(&T, &T) -> bool) -> usize {
    let row = rows
        .iter()
        .position(|placed| !placed.iter().any(|other| conflicts(other, &item)))
        .unwrap_or(rows.len());
    if row == rows.len() {
        rows.push(Vec::new());
    }
    rows[row].push(item);
    row
}

/// Layout functions bound to a validated [`LayoutConfig`].
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Fails fast on parameters that can only come from a caller bug.
    pub fn new(config: LayoutConfig) -> AgendaResult<Self> {
        config.validate()?;
        Ok(LayoutEngine { config })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out a single day column.
    pub fn layout_day<'a>(&self, day: NaiveDate, appointments: &'a [Appointment]) -> Vec<LayoutBlock<'a>> {
        timegrid::layout_column(&self.config, day, 0, appointments)
    }

    /// Lay out the seven day columns starting at `week_start`.
    ///
    /// Multi-day appointments appear, clipped, in every column they touch.
    pub fn layout_week<'a>(
        &self,
        week_start: NaiveDate,
        appointments: &'a [Appointment],
    ) -> Vec<LayoutBlock<'a>> {
        week_start
            .iter_days()
            .take(7)
            .enumerate()
            .flat_map(|(column, day)| timegrid::layout_column(&self.config, day, column, appointments))
            .collect()
    }

    /// Lay out the whole-week grid of the month containing `month`.
    pub fn layout_month<'a>(&self, month: NaiveDate, appointments: &'a [Appointment]) -> MonthLayout<'a> {
        month::layout_month(&self.config, month, appointments)
    }
}
