use agenda_core::appointment::AppointmentId;
use agenda_core::window::Granularity;
use anyhow::Result;
use dialoguer::Input;

use super::{Ctx, report_validation, with_spinner};

pub async fn run(ctx: &Ctx, id: AppointmentId, reason: Option<String>) -> Result<()> {
    let reason = match reason {
        Some(r) => r,
        None => Input::<String>::new()
            .with_prompt("  Reason for cancelling")
            .allow_empty(true)
            .interact_text()?,
    };

    let today = chrono::Local::now().date_naive();
    let mut session = ctx.session(today, Granularity::Day)?;
    with_spinner("Cancelling appointment", session.cancel(id, &reason))
        .await
        .map_err(report_validation)?;

    Ok(())
}
