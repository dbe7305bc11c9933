use agenda_core::api::UserDirectory;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::{Ctx, with_spinner};
use crate::render::Render;

pub async fn run(ctx: &Ctx) -> Result<()> {
    let backend = ctx.backend()?;
    let mut users = with_spinner("Fetching users", backend.fetch_users())
        .await
        .context("Failed to fetch users")?;

    if users.is_empty() {
        println!("{}", format!("No users available from {}", backend.describe()).dimmed());
        return Ok(());
    }

    users.sort_by(|a, b| a.display_name.trim().cmp(b.display_name.trim()));
    for user in &users {
        let marker = if ctx.config.user_id == Some(user.id) { " (you)" } else { "" };
        println!("{}{}", user.render(), marker.dimmed());
    }

    Ok(())
}
