use agenda_core::window::Granularity;
use anyhow::Result;
use owo_colors::OwoColorize;

use super::{Ctx, refresh};
use crate::render::{Render, day_label};

pub async fn run(ctx: &Ctx, limit: usize) -> Result<()> {
    let now = chrono::Local::now().naive_local();
    let mut session = ctx.session(now.date(), Granularity::Month)?;
    refresh(&mut session).await?;

    let upcoming = session.upcoming(now, limit);
    if upcoming.is_empty() {
        println!("{}", "No upcoming appointments".dimmed());
        return Ok(());
    }

    // Group by day
    let mut current_date = None;
    for appt in &upcoming {
        let date = appt.start.date();
        if current_date != Some(date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", day_label(date).bold());
            current_date = Some(date);
        }

        let access = session.access_mode(appt);
        let marker = if access.can_edit() { "" } else { " (view only)" };
        println!("  {}{}", appt.render(), marker.dimmed());
    }

    Ok(())
}
