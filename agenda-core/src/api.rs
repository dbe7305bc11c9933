//! Boundary traits for the appointment backend.
//!
//! The session only talks to these traits. The CLI implements them over
//! HTTP and over a local JSON snapshot; tests use in-memory fakes.

use async_trait::async_trait;
use chrono::Duration;
use serde::Serialize;

use crate::appointment::{AppointmentId, User, UserId};
use crate::config::AgendaConfig;
use crate::error::AgendaResult;
use crate::record::SanitizeReport;
use crate::time::format_timestamp;
use crate::validate::AppointmentDraft;
use crate::window::ViewWindow;

/// Read side: appointments for a range.
#[async_trait]
pub trait AppointmentSource: Send + Sync {
    /// Records overlapping `window`, decoded leniently. The server's range
    /// filter is coarse; callers still apply the exact overlap rule.
    async fn fetch_appointments(&self, window: &ViewWindow) -> AgendaResult<SanitizeReport>;
}

/// Write side. Callers re-fetch after every successful mutation.
#[async_trait]
pub trait MutationSink: Send + Sync {
    async fn create_appointment(&self, draft: &AppointmentDraft) -> AgendaResult<()>;

    async fn update_appointment(&self, id: AppointmentId, draft: &AppointmentDraft) -> AgendaResult<()>;

    async fn cancel_appointment(&self, id: AppointmentId, reason: &str) -> AgendaResult<()>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn fetch_users(&self) -> AgendaResult<Vec<User>>;
}

pub trait AuthProvider {
    fn is_authenticated(&self) -> bool;

    fn current_user(&self) -> Option<UserId>;
}

/// A backend that can both serve and change appointments.
pub trait AppointmentApi: AppointmentSource + MutationSink {}

impl<T: AppointmentSource + MutationSink> AppointmentApi for T {}

/// Body of `PUT /appointment/cancel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest<'a> {
    pub appointment_id: AppointmentId,
    pub cancel_reason: &'a str,
}

/// `startDate`/`endDate` query values for `GET /appointment/list`.
///
/// The API treats `endDate` as inclusive, so the half-open window end is
/// sent as its last second.
pub fn list_query(window: &ViewWindow) -> [(&'static str, String); 2] {
    [
        ("startDate", format_timestamp(&window.start)),
        ("endDate", format_timestamp(&(window.end - Duration::seconds(1)))),
    ]
}

/// Auth state taken from the user's configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfiguredAuth {
    pub token: Option<String>,
    pub user_id: Option<UserId>,
}

impl ConfiguredAuth {
    pub fn from_config(config: &AgendaConfig) -> Self {
        ConfiguredAuth {
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
            user_id: config.user_id,
        }
    }
}

impl AuthProvider for ConfiguredAuth {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn current_user(&self) -> Option<UserId> {
        self.user_id
    }
}
