use agenda_core::api::{AppointmentSource, AuthProvider, ConfiguredAuth, MutationSink, UserDirectory};
use agenda_core::appointment::{AppointmentId, User};
use agenda_core::config::AgendaConfig;
use agenda_core::error::AgendaResult;
use agenda_core::record::SanitizeReport;
use agenda_core::validate::AppointmentDraft;
use agenda_core::window::ViewWindow;
use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

use crate::client::Client;
use crate::snapshot::Snapshot;

/// Where appointments come from: the API, or a local snapshot file.
pub enum Backend {
    Api(Client),
    Snapshot(Snapshot),
}

impl Backend {
    /// A snapshot (from `--snapshot` or the config) wins over the API.
    pub fn from_config(config: &AgendaConfig, snapshot: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = snapshot.or_else(|| config.snapshot_path()) {
            return Ok(Backend::Snapshot(Snapshot::open(path)));
        }

        let Some(base_url) = config.api_base_url.as_deref() else {
            anyhow::bail!(
                "No data source configured.\n\n\
                Set api_base_url and token in {}\n\
                or pass --snapshot <file>",
                AgendaConfig::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "the config file".into())
            );
        };

        let auth = ConfiguredAuth::from_config(config);
        if !auth.is_authenticated() {
            anyhow::bail!("Not logged in. Set `token` in your config or AGENDA_TOKEN.");
        }

        Ok(Backend::Api(Client::new(base_url, auth.token.as_deref().unwrap_or_default())?))
    }

    pub fn describe(&self) -> String {
        match self {
            Backend::Api(_) => "API".to_string(),
            Backend::Snapshot(s) => s.path().display().to_string(),
        }
    }
}

#[async_trait]
impl AppointmentSource for Backend {
    async fn fetch_appointments(&self, window: &ViewWindow) -> AgendaResult<SanitizeReport> {
        match self {
            Backend::Api(c) => c.fetch_appointments(window).await,
            Backend::Snapshot(s) => s.fetch_appointments(window).await,
        }
    }
}

#[async_trait]
impl MutationSink for Backend {
    async fn create_appointment(&self, draft: &AppointmentDraft) -> AgendaResult<()> {
        match self {
            Backend::Api(c) => c.create_appointment(draft).await,
            Backend::Snapshot(s) => s.create_appointment(draft).await,
        }
    }

    async fn update_appointment(&self, id: AppointmentId, draft: &AppointmentDraft) -> AgendaResult<()> {
        match self {
            Backend::Api(c) => c.update_appointment(id, draft).await,
            Backend::Snapshot(s) => s.update_appointment(id, draft).await,
        }
    }

    async fn cancel_appointment(&self, id: AppointmentId, reason: &str) -> AgendaResult<()> {
        match self {
            Backend::Api(c) => c.cancel_appointment(id, reason).await,
            Backend::Snapshot(s) => s.cancel_appointment(id, reason).await,
        }
    }
}

#[async_trait]
impl UserDirectory for Backend {
    async fn fetch_users(&self) -> AgendaResult<Vec<User>> {
        match self {
            Backend::Api(c) => c.fetch_users().await,
            Backend::Snapshot(s) => s.fetch_users().await,
        }
    }
}
