//! HTTP client for the appointment API

use agenda_core::api::{AppointmentSource, CancelRequest, MutationSink, UserDirectory, list_query};
use agenda_core::appointment::{AppointmentId, User};
use agenda_core::error::{AgendaError, AgendaResult};
use agenda_core::record::{SanitizeReport, parse_records};
use agenda_core::validate::AppointmentDraft;
use agenda_core::window::ViewWindow;
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Bearer-authenticated client for the appointment API
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(alias = "error")]
    message: String,
}

impl Client {
    pub fn new(base_url: &str, token: &str) -> AgendaResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| AgendaError::Config(format!("Invalid api_base_url '{base_url}': {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AgendaError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            token: token.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> AgendaResult<Url> {
        let url = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&url).map_err(|e| AgendaError::Config(format!("Invalid endpoint '{url}': {e}")))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> AgendaResult<Response> {
        let resp = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AgendaError::Network(e.to_string()))?;

        check_status(resp).await
    }
}

/// Map non-success responses to errors, keeping the server's message when it sends one.
async fn check_status(resp: Response) -> AgendaResult<Response> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(AgendaError::Unauthorized);
    }
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            }
        });

    Err(AgendaError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl AppointmentSource for Client {
    /// GET /appointment/list
    async fn fetch_appointments(&self, window: &ViewWindow) -> AgendaResult<SanitizeReport> {
        let url = self.endpoint("appointment/list")?;
        let resp = self.send(self.http.get(url).query(&list_query(window))).await?;
        let body = resp
            .text()
            .await
            .map_err(|e| AgendaError::Network(e.to_string()))?;

        parse_records(&body)
    }
}

#[async_trait]
impl MutationSink for Client {
    /// POST /appointment/create
    async fn create_appointment(&self, draft: &AppointmentDraft) -> AgendaResult<()> {
        let url = self.endpoint("appointment/create")?;
        self.send(self.http.post(url).json(&draft.to_record())).await?;
        Ok(())
    }

    /// PUT /appointment/update
    async fn update_appointment(&self, id: AppointmentId, draft: &AppointmentDraft) -> AgendaResult<()> {
        let url = self.endpoint("appointment/update")?;
        let body = draft.clone().into_update(id)?;
        self.send(self.http.put(url).json(&body)).await?;
        Ok(())
    }

    /// PUT /appointment/cancel
    async fn cancel_appointment(&self, id: AppointmentId, reason: &str) -> AgendaResult<()> {
        let url = self.endpoint("appointment/cancel")?;
        let body = CancelRequest {
            appointment_id: id,
            cancel_reason: reason,
        };
        self.send(self.http.put(url).json(&body)).await?;
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for Client {
    /// GET /users
    async fn fetch_users(&self) -> AgendaResult<Vec<User>> {
        let url = self.endpoint("users")?;
        let resp = self.send(self.http.get(url)).await?;
        resp.json()
            .await
            .map_err(|e| AgendaError::Serialization(e.to_string()))
    }
}
