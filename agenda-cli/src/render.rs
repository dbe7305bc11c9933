//! TUI rendering traits for agenda types.
//!
//! This module provides extension traits that add colored terminal rendering
//! to agenda-core types using owo_colors.

use agenda_core::appointment::{Appointment, AppointmentStatus, User};
use agenda_core::error::FieldError;
use agenda_core::layout::{LayoutBlock, MonthLayout, Placement};
use agenda_core::notifier::{Toast, ToastKind};
use agenda_core::session::ViewLayout;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

/// Width of one day cell in the month grid, separator included.
const MONTH_CELL_WIDTH: usize = 14;

impl Render for Toast {
    fn render(&self) -> String {
        match self.kind {
            ToastKind::Success => format!("{} {}", "✓".green(), self.message.green()),
            ToastKind::Error => format!("{} {}", "✗".red(), self.message.red()),
        }
    }
}

impl Render for AppointmentStatus {
    fn render(&self) -> String {
        match self {
            AppointmentStatus::Scheduled => String::new(),
            AppointmentStatus::Cancelled => "cancelled".red().to_string(),
            AppointmentStatus::Completed => "completed".green().to_string(),
            AppointmentStatus::Other(id) => format!("status {id}").dimmed().to_string(),
        }
    }
}

impl Render for Appointment {
    fn render(&self) -> String {
        let mut line = format!(
            "{} {} {}",
            swatch(self.color()),
            format_span(self.start, self.end),
            self.title
        );
        if let Some(location) = &self.location {
            line.push_str(&format!(" {}", format!("@ {location}").dimmed()));
        }
        let status = self.status.render();
        if !status.is_empty() {
            line.push_str(&format!(" [{status}]"));
        }
        line.push_str(&format!(" {}", format!("#{}", self.id).dimmed()));
        line
    }
}

impl Render for User {
    fn render(&self) -> String {
        format!("{:>6}  {}", self.id.to_string().dimmed(), self.display_name)
    }
}

impl Render for FieldError {
    fn render(&self) -> String {
        format!("   {} {}", format!("{}:", self.field).dimmed(), self.message.red())
    }
}

impl Render for ViewLayout<'_> {
    fn render(&self) -> String {
        match self {
            ViewLayout::Day { date, blocks } => render_time_grid(&[*date], blocks),
            ViewLayout::Week { week_start, blocks } => {
                let days: Vec<NaiveDate> = week_start.iter_days().take(7).collect();
                render_time_grid(&days, blocks)
            }
            ViewLayout::Month(layout) => render_month(layout),
        }
    }
}

/// One section per day column, blocks listed by visible start. Lanes of
/// overlapping blocks are shown as indentation.
fn render_time_grid(days: &[NaiveDate], blocks: &[LayoutBlock<'_>]) -> String {
    let mut lines = Vec::new();

    for (column, day) in days.iter().enumerate() {
        if column > 0 {
            lines.push(String::new());
        }
        lines.push(day_label(*day).bold().to_string());

        let mut column_blocks: Vec<&LayoutBlock<'_>> =
            blocks.iter().filter(|b| b.column == column).collect();
        if column_blocks.is_empty() {
            lines.push(format!("   {}", "No appointments".dimmed()));
            continue;
        }
        column_blocks.sort_by_key(|b| b.visible_start);

        for block in column_blocks {
            let lane = match block.placement {
                Placement::TimeGrid { lane, .. } => lane,
                Placement::MonthBar { .. } => 0,
            };
            let appt = block.appointment;
            let mut line = format!(
                "   {}{} {} {}",
                "  ".repeat(lane),
                swatch(appt.color()),
                format_span(block.visible_start, block.visible_end),
                appt.title
            );
            if block.clipped {
                line.push_str(&format!(" {}", "(continues)".dimmed()));
            }
            let status = appt.status.render();
            if !status.is_empty() {
                line.push_str(&format!(" [{status}]"));
            }
            lines.push(line);
        }
    }

    lines.join("\n")
}

fn render_month(layout: &MonthLayout<'_>) -> String {
    let today = chrono::Local::now().date_naive();
    let rows = layout.blocks.iter().map(|b| b.row + 1).max().unwrap_or(0);
    let mut lines = vec![layout.month.format("%B %Y").to_string().bold().to_string()];

    let weekdays: String = layout
        .days()
        .take(7)
        .map(|d| pad(&d.format("%a").to_string(), MONTH_CELL_WIDTH))
        .collect();
    lines.push(weekdays.dimmed().to_string());

    for week in 0..layout.weeks {
        let week_start = layout.grid_start + Duration::days(7 * week as i64);

        let header: String = week_start
            .iter_days()
            .take(7)
            .map(|day| {
                let cell = pad(&day.day().to_string(), MONTH_CELL_WIDTH);
                if day == today {
                    cell.reversed().to_string()
                } else if layout.in_month(day) {
                    cell
                } else {
                    cell.dimmed().to_string()
                }
            })
            .collect();
        lines.push(header);

        let week_blocks: Vec<&LayoutBlock<'_>> = layout.blocks_in_week(week).collect();
        for row in 0..rows {
            let line = render_month_row(&week_blocks, row);
            if !line.trim().is_empty() {
                lines.push(line);
            }
        }

        if let Some(overflow) = layout.overflow.get(week).filter(|o| o.hidden > 0) {
            let more: String = overflow
                .hidden_per_day
                .iter()
                .map(|&n| {
                    if n == 0 {
                        " ".repeat(MONTH_CELL_WIDTH)
                    } else {
                        pad(&format!("+{n} more"), MONTH_CELL_WIDTH).dimmed().to_string()
                    }
                })
                .collect();
            lines.push(more);
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// One packing row of a week: each bar drawn across the columns it spans.
fn render_month_row(blocks: &[&LayoutBlock<'_>], row: usize) -> String {
    let mut line = String::new();
    let mut column = 0;

    while column < 7 {
        let bar = blocks.iter().find_map(|b| match b.placement {
            Placement::MonthBar {
                start_column,
                end_column,
                ..
            } if b.row == row && start_column == column => Some((b, end_column)),
            _ => None,
        });

        match bar {
            Some((block, end_column)) => {
                let width = (end_column - column + 1) * MONTH_CELL_WIDTH;
                let text = pad(&block.appointment.title, width - 1);
                line.push_str(&colorize(&text, block.appointment.color()));
                line.push(' ');
                column = end_column + 1;
            }
            None => {
                line.push_str(&" ".repeat(MONTH_CELL_WIDTH));
                column += 1;
            }
        }
    }

    line
}

/// Label a date relative to today (e.g. "Today", "Tomorrow", "Wed Feb 25")
pub fn day_label(date: NaiveDate) -> String {
    let today = chrono::Local::now().date_naive();

    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

/// "09:00-10:30", with the end date added when it falls on another day.
fn format_span(start: NaiveDateTime, end: NaiveDateTime) -> String {
    if end.date() == start.date() || end == (start.date() + Duration::days(1)).and_time(Default::default()) {
        format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
    } else {
        format!("{}-{}", start.format("%H:%M"), end.format("%b %-d %H:%M"))
    }
}

/// Pad or truncate `text` to exactly `width` characters.
fn pad(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    } else {
        format!("{text}{}", " ".repeat(width - count))
    }
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn colorize(text: &str, color: &str) -> String {
    match parse_hex(color) {
        Some((r, g, b)) => text.on_truecolor(r, g, b).black().to_string(),
        None => text.on_blue().to_string(),
    }
}

fn swatch(color: &str) -> String {
    match parse_hex(color) {
        Some((r, g, b)) => "●".truecolor(r, g, b).to_string(),
        None => "●".blue().to_string(),
    }
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
