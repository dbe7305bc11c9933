//! Offline backend: appointments kept in a local JSON file.
//!
//! The file holds a JSON array of appointment records in the API's wire
//! format. Mutations rewrite the file, so a snapshot can stand in for the
//! API end to end.

use std::path::{Path, PathBuf};

use agenda_core::api::{AppointmentSource, MutationSink, UserDirectory};
use agenda_core::appointment::{AppointmentId, AppointmentStatus, User};
use agenda_core::error::{AgendaError, AgendaResult};
use agenda_core::record::{SanitizeReport, parse_records};
use agenda_core::validate::AppointmentDraft;
use agenda_core::window::ViewWindow;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

pub struct Snapshot {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file.
    write_lock: Mutex<()>,
}

impl Snapshot {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Snapshot {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_text(&self) -> AgendaResult<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok("[]".to_string()),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_values(&self) -> AgendaResult<Vec<Value>> {
        serde_json::from_str(&self.read_text().await?).map_err(|e| {
            AgendaError::Serialization(format!("{}: {e}", self.path.display()))
        })
    }

    async fn write_values(&self, values: &[Value]) -> AgendaResult<()> {
        let content = serde_json::to_string_pretty(values)
            .map_err(|e| AgendaError::Serialization(e.to_string()))?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    /// Apply `edit` to the record with `id` and save.
    async fn edit_record(
        &self,
        id: AppointmentId,
        edit: impl FnOnce(&mut serde_json::Map<String, Value>) + Send,
    ) -> AgendaResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.read_values().await?;

        let record = values
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|obj| obj.get("appointmentId").and_then(Value::as_i64) == Some(id))
            .ok_or_else(|| AgendaError::Api {
                status: 404,
                message: format!("Appointment {id} not found"),
            })?;
        edit(record);

        self.write_values(&values).await
    }
}

#[async_trait]
impl AppointmentSource for Snapshot {
    async fn fetch_appointments(&self, window: &ViewWindow) -> AgendaResult<SanitizeReport> {
        debug!(path = %self.path.display(), from = %window.start, to = %window.end, "reading snapshot");
        parse_records(&self.read_text().await?)
    }
}

#[async_trait]
impl MutationSink for Snapshot {
    async fn create_appointment(&self, draft: &AppointmentDraft) -> AgendaResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.read_values().await?;

        let next_id = values
            .iter()
            .filter_map(|v| v.get("appointmentId").and_then(Value::as_i64))
            .max()
            .unwrap_or(0)
            + 1;

        let mut record = draft.to_record();
        record.appointment_id = Some(next_id);
        values.push(
            serde_json::to_value(&record).map_err(|e| AgendaError::Serialization(e.to_string()))?,
        );

        self.write_values(&values).await
    }

    async fn update_appointment(&self, id: AppointmentId, draft: &AppointmentDraft) -> AgendaResult<()> {
        let Value::Object(changes) = draft.clone().into_update(id)? else {
            return Err(AgendaError::Serialization("update body is not an object".into()));
        };
        self.edit_record(id, move |record| record.extend(changes)).await
    }

    async fn cancel_appointment(&self, id: AppointmentId, reason: &str) -> AgendaResult<()> {
        let reason = reason.to_string();
        self.edit_record(id, move |record| {
            record.insert("statusId".into(), AppointmentStatus::Cancelled.id().into());
            record.insert("cancelReason".into(), reason.into());
        })
        .await
    }
}

#[async_trait]
impl UserDirectory for Snapshot {
    /// Snapshots carry no user directory.
    async fn fetch_users(&self) -> AgendaResult<Vec<User>> {
        Ok(Vec::new())
    }
}
