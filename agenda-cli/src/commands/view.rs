use agenda_core::window::Granularity;
use anyhow::{Context, Result};
use chrono::NaiveDate;

use super::{Ctx, refresh};
use crate::render::Render;

pub async fn run(ctx: &Ctx, granularity: Granularity, date: Option<NaiveDate>, json: bool) -> Result<()> {
    let anchor = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let mut session = ctx.session(anchor, granularity)?;
    refresh(&mut session).await?;

    let instances = session.instances();
    let layout = session.layout(&instances);

    if json {
        let out = serde_json::to_string_pretty(&layout).context("Failed to serialize layout")?;
        println!("{out}");
    } else {
        println!("{}", layout.render());
    }

    Ok(())
}
