use agenda_core::config::AgendaConfig;
use anyhow::Result;
use owo_colors::OwoColorize;

use super::Ctx;

pub fn run(ctx: &Ctx) -> Result<()> {
    let config_path = AgendaConfig::config_path()?;
    let config = &ctx.config;
    let unset = "(not set)".dimmed().to_string();

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!(
        "  Snapshot:   {}",
        ctx.snapshot
            .clone()
            .or_else(|| config.snapshot_path())
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| unset.clone())
    );

    println!();
    println!("{}", "Account".bold());
    println!(
        "  API:        {}",
        config.api_base_url.clone().unwrap_or_else(|| unset.clone())
    );
    println!(
        "  Token:      {}",
        if config.token.as_deref().is_some_and(|t| !t.trim().is_empty()) {
            "set".to_string()
        } else {
            unset.clone()
        }
    );
    println!(
        "  User id:    {}",
        config.user_id.map(|id| id.to_string()).unwrap_or(unset)
    );

    let layout = &config.layout;
    println!();
    println!("{}", "Layout".bold());
    println!("  Week start:     {}", layout.week_start);
    println!("  Visible rows:   {}", layout.max_visible_rows);
    println!("  Hour height:    {}px", layout.hour_height);
    println!("  Label column:   {}px", layout.label_column_width);
    println!("  Min block:      {}m", layout.min_block_duration_minutes);
    println!("  Toasts:         {}", config.toast_duration);

    Ok(())
}
