use agenda_core::appointment::{Appointment, AppointmentId, UserId};
use agenda_core::upcoming::AccessMode;
use agenda_core::window::Granularity;
use anyhow::{Result, bail};
use chrono::NaiveDate;

use super::create::{DraftArgs, require_user};
use super::{Ctx, refresh, report_validation, with_spinner};

/// Replace appointment `id`. `current` is a date the appointment is on now,
/// which defaults to the new start date.
pub async fn run(ctx: &Ctx, id: AppointmentId, current: Option<NaiveDate>, args: DraftArgs) -> Result<()> {
    let organizer = require_user(ctx)?;
    let draft = args.into_draft(organizer)?;
    let around = current.unwrap_or_else(|| draft.start.date());

    let mut session = ctx.session(around, Granularity::Month)?;
    refresh(&mut session).await?;
    ensure_editable(session.appointments(), Some(organizer), id, around)?;

    with_spinner("Updating appointment", session.update(id, &draft))
        .await
        .map_err(report_validation)?;

    Ok(())
}

/// The appointment must be among those fetched and organized by `user`.
fn ensure_editable(
    appointments: &[Appointment],
    user: Option<UserId>,
    id: AppointmentId,
    around: NaiveDate,
) -> Result<()> {
    let Some(existing) = appointments.iter().find(|a| a.id == id) else {
        bail!(
            "Appointment {id} not found in the month around {around}. \
            Pass --current <YYYY-MM-DD> with a date it is on now"
        );
    };

    if AccessMode::for_user(user, existing) == AccessMode::View {
        bail!("Appointment {id} is view only: only the organizer can edit it");
    }
    Ok(())
}
