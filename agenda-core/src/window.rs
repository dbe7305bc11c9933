//! View windows: the visible `[start, end)` range of a calendar view.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{AgendaError, AgendaResult};
use crate::time::{last_covered_date, start_of_day, week_start_of};

/// View granularity selected by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

impl std::str::FromStr for Granularity {
    type Err = AgendaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            other => Err(AgendaError::InvalidParameter(format!(
                "unknown view '{other}' (expected day, week or month)"
            ))),
        }
    }
}

/// Half-open visible range. `end` is the first instant no longer shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ViewWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> AgendaResult<Self> {
        if end <= start {
            return Err(AgendaError::InvalidWindow(format!(
                "end {end} is not after start {start}"
            )));
        }
        Ok(ViewWindow { start, end })
    }

    /// Window for the natural period of `granularity` that contains `anchor`.
    pub fn containing(anchor: NaiveDate, granularity: Granularity, week_start: Weekday) -> Self {
        let (first, next) = match granularity {
            Granularity::Day => (anchor, anchor + Duration::days(1)),
            Granularity::Week => {
                let first = week_start_of(anchor, week_start);
                (first, first + Duration::days(7))
            }
            Granularity::Month => {
                let first = first_of_month(anchor);
                (first, first + Months::new(1))
            }
        };
        ViewWindow {
            start: start_of_day(first),
            end: start_of_day(next),
        }
    }

    /// Whole-week grid covering the month that contains `month`.
    ///
    /// Runs from the start of the week holding the 1st to the end of the week
    /// holding the last day, so it always spans a whole number of weeks.
    pub fn month_grid(month: NaiveDate, week_start: Weekday) -> Self {
        let first = first_of_month(month);
        let last = first + Months::new(1) - Duration::days(1);
        let grid_start = week_start_of(first, week_start);
        let grid_end = week_start_of(last, week_start) + Duration::days(7);
        ViewWindow {
            start: start_of_day(grid_start),
            end: start_of_day(grid_end),
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Last date any part of which is inside the window.
    pub fn last_date(&self) -> NaiveDate {
        last_covered_date(self.start, self.end)
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        self.start_date()
            .iter_days()
            .take_while(|d| *d <= self.last_date())
            .collect()
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start && instant < self.end
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Navigation state: the anchor date and granularity driving the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    anchor: NaiveDate,
    granularity: Granularity,
    week_start: Weekday,
}

impl Navigator {
    pub fn new(anchor: NaiveDate, granularity: Granularity, week_start: Weekday) -> Self {
        Navigator {
            anchor,
            granularity,
            week_start,
        }
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// The period currently shown.
    pub fn window(&self) -> ViewWindow {
        ViewWindow::containing(self.anchor, self.granularity, self.week_start)
    }

    /// The range whose appointments the current view needs. Month views
    /// show leading and trailing days, so this is the whole week grid.
    pub fn fetch_window(&self) -> ViewWindow {
        match self.granularity {
            Granularity::Month => ViewWindow::month_grid(self.anchor, self.week_start),
            _ => self.window(),
        }
    }

    pub fn next(&mut self) {
        self.anchor = self.step(1);
    }

    pub fn previous(&mut self) {
        self.anchor = self.step(-1);
    }

    pub fn jump_to(&mut self, date: NaiveDate) {
        self.anchor = date;
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
    }

    fn step(&self, direction: i32) -> NaiveDate {
        let start = self.window().start_date();
        match (self.granularity, direction.is_positive()) {
            (Granularity::Day, true) => start + Duration::days(1),
            (Granularity::Day, false) => start - Duration::days(1),
            (Granularity::Week, true) => start + Duration::days(7),
            (Granularity::Week, false) => start - Duration::days(7),
            (Granularity::Month, true) => start + Months::new(1),
            (Granularity::Month, false) => start - Months::new(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
    }

    #[test]
    fn day_window_is_half_open() {
        let w = ViewWindow::containing(date("2025-01-02"), Granularity::Day, Weekday::Sun);
        assert_eq!(w.start, dt("2025-01-02T00:00"));
        assert_eq!(w.end, dt("2025-01-03T00:00"));
        assert!(!w.contains(dt("2025-01-03T00:00")));
        assert_eq!(w.days(), vec![date("2025-01-02")]);
    }

    #[test]
    fn week_window_follows_week_start() {
        let sunday = ViewWindow::containing(date("2025-01-08"), Granularity::Week, Weekday::Sun);
        assert_eq!(sunday.start_date(), date("2025-01-05"));
        assert_eq!(sunday.days().len(), 7);

        let monday = ViewWindow::containing(date("2025-01-08"), Granularity::Week, Weekday::Mon);
        assert_eq!(monday.start_date(), date("2025-01-06"));
        assert_eq!(monday.last_date(), date("2025-01-12"));
    }

    #[test]
    fn month_window_and_grid() {
        let w = ViewWindow::containing(date("2025-02-14"), Granularity::Month, Weekday::Sun);
        assert_eq!(w.start, dt("2025-02-01T00:00"));
        assert_eq!(w.end, dt("2025-03-01T00:00"));

        // Feb 2025: Sat 1st .. Fri 28th
        let grid = ViewWindow::month_grid(date("2025-02-14"), Weekday::Sun);
        assert_eq!(grid.start_date(), date("2025-01-26"));
        assert_eq!(grid.last_date(), date("2025-03-01"));
        assert_eq!(grid.days().len() % 7, 0);
        assert_eq!(grid.days().len(), 35);
    }

    #[test]
    fn explicit_window_must_be_non_empty() {
        assert!(ViewWindow::new(dt("2025-01-02T00:00"), dt("2025-01-02T00:00")).is_err());
        assert!(ViewWindow::new(dt("2025-01-02T00:00"), dt("2025-01-01T00:00")).is_err());
        assert!(ViewWindow::new(dt("2025-01-01T00:00"), dt("2025-01-02T00:00")).is_ok());
    }

    #[test]
    fn navigator_steps_by_period() {
        let mut nav = Navigator::new(date("2025-01-31"), Granularity::Month, Weekday::Sun);
        nav.next();
        assert_eq!(nav.window().start_date(), date("2025-02-01"));
        nav.previous();
        nav.previous();
        assert_eq!(nav.window().start_date(), date("2024-12-01"));

        nav.set_granularity(Granularity::Week);
        nav.jump_to(date("2025-01-08"));
        nav.next();
        assert_eq!(nav.window().start_date(), date("2025-01-12"));

        nav.set_granularity(Granularity::Day);
        nav.previous();
        assert_eq!(nav.window().start_date(), date("2025-01-11"));
    }

    #[test]
    fn month_fetch_window_covers_grid() {
        let nav = Navigator::new(date("2025-02-14"), Granularity::Month, Weekday::Sun);
        assert_eq!(nav.fetch_window(), ViewWindow::month_grid(date("2025-02-14"), Weekday::Sun));
        let day = Navigator::new(date("2025-02-14"), Granularity::Day, Weekday::Sun);
        assert_eq!(day.fetch_window(), day.window());
    }

    #[test]
    fn granularity_parses_case_insensitively() {
        assert_eq!("Week".parse::<Granularity>().unwrap(), Granularity::Week);
        assert!("year".parse::<Granularity>().is_err());
    }
}
