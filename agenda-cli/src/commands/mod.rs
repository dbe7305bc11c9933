pub mod cancel;
pub mod config;
pub mod create;
pub mod update;
pub mod upcoming;
pub mod users;
pub mod view;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use agenda_core::config::AgendaConfig;
use agenda_core::error::AgendaError;
use agenda_core::layout::LayoutEngine;
use agenda_core::notifier::Notifier;
use agenda_core::session::CalendarSession;
use agenda_core::window::Granularity;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use crate::backend::Backend;
use crate::render::Render;
use crate::toast::TerminalSurface;

pub type Session = CalendarSession<Backend, TerminalSurface>;

/// Configuration shared by every command.
pub struct Ctx {
    pub config: AgendaConfig,
    pub snapshot: Option<PathBuf>,
}

impl Ctx {
    pub fn load(snapshot: Option<PathBuf>) -> Result<Self> {
        let config = AgendaConfig::load().context("Failed to load config")?;
        Ok(Ctx { config, snapshot })
    }

    pub fn backend(&self) -> Result<Backend> {
        Backend::from_config(&self.config, self.snapshot.clone())
    }

    pub fn session(&self, anchor: NaiveDate, granularity: Granularity) -> Result<Session> {
        let engine = LayoutEngine::new(self.config.layout.clone()).context("Invalid [layout] config")?;
        let notifier = Notifier::new(TerminalSurface, self.config.toast_duration()?);

        Ok(CalendarSession::new(self.backend()?, engine, notifier, anchor, granularity)
            .with_user(self.config.user_id))
    }
}

/// Await `work` with a spinner showing `message`.
pub async fn with_spinner<T>(message: &str, work: impl Future<Output = T>) -> T {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/", "-"])
        .template("{msg} {spinner}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = work.await;
    spinner.finish_and_clear();
    result
}

/// Refresh the session, reporting records that had to be skipped.
pub async fn refresh(session: &mut Session) -> Result<()> {
    with_spinner("Fetching appointments", session.refresh())
        .await
        .context("Failed to fetch appointments")?;

    let rejected = session.rejected();
    if rejected > 0 {
        println!(
            "{}",
            format!(
                "Skipped {} malformed {} (run with -v for details)",
                rejected,
                crate::render::pluralize("record", rejected)
            )
            .dimmed()
        );
    }
    Ok(())
}

/// Print field errors of a failed validation; other errors pass through.
pub fn report_validation(err: AgendaError) -> anyhow::Error {
    if let AgendaError::Validation(errors) = &err {
        println!("{}", "Appointment not saved:".red());
        for e in errors {
            println!("{}", e.render());
        }
    }
    err.into()
}
