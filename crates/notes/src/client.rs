use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use trip_core::model::{decode_records, notes_url, NoteRow, NotesBook, StageId};

#[derive(Debug, Error)]
pub enum NotesError {
    #[error("notes request failed: {0}")]
    Transport(String),
    #[error("notes endpoint returned HTTP {0}")]
    Status(u16),
    #[error("notes endpoint sent invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("notes endpoint sent an unexpected payload: expected {0}")]
    Payload(&'static str),
    #[error("notes endpoint rejected the update")]
    Rejected,
}

impl From<reqwest::Error> for NotesError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => NotesError::Status(status.as_u16()),
            None => NotesError::Transport(err.to_string()),
        }
    }
}

/// Raw HTTP access to the notes endpoint. Bodies are returned as text and
/// decoded by [`NotesClient`].
#[async_trait]
pub trait NotesTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, NotesError>;
    async fn post_form(&self, url: &str, form: &[(&str, String)]) -> Result<String, NotesError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotesTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, NotesError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    async fn post_form(&self, url: &str, form: &[(&str, String)]) -> Result<String, NotesError> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

/// A note to store for one person in one stage. The endpoint keeps whatever
/// arrives last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteUpdate {
    pub stage: StageId,
    pub person: String,
    pub activity: String,
}

#[derive(Debug, Clone, Deserialize)]
struct UpdateResponse {
    #[serde(default)]
    success: bool,
}

#[derive(Clone)]
pub struct NotesClient {
    endpoint: String,
    transport: Arc<dyn NotesTransport>,
}

impl NotesClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_transport(endpoint, Arc::new(HttpTransport::default()))
    }

    pub fn with_transport(endpoint: impl Into<String>, transport: Arc<dyn NotesTransport>) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        notes_url(&self.endpoint, path)
    }

    /// Every note, grouped by stage. An empty or `null` body is an empty
    /// book; malformed rows are skipped.
    pub async fn fetch_book(&self) -> Result<NotesBook, NotesError> {
        let body = self.transport.get(&self.url("data")).await?;
        if body.trim().is_empty() {
            return Ok(NotesBook::default());
        }
        let rows = match serde_json::from_str::<Value>(&body)? {
            Value::Null => return Ok(NotesBook::default()),
            Value::Array(rows) => rows,
            _ => return Err(NotesError::Payload("an array of notes")),
        };

        let decoded = decode_records::<NoteRow>("note row", &rows);
        for warning in &decoded.warnings {
            warn!(%warning, "ignoring note row");
        }
        debug!(rows = decoded.items.len(), "fetched notes");
        Ok(NotesBook::from_rows(decoded.items))
    }

    /// Store one note. Callers re-fetch afterwards; nothing is merged
    /// locally.
    pub async fn save(&self, update: &NoteUpdate) -> Result<(), NotesError> {
        let form = [
            ("stage", update.stage.to_string()),
            ("person", update.person.trim().to_string()),
            ("activity", update.activity.clone()),
        ];
        let body = self.transport.post_form(&self.url("update"), &form).await?;
        let response: UpdateResponse = serde_json::from_str(&body)?;
        if !response.success {
            return Err(NotesError::Rejected);
        }
        debug!(stage = %update.stage, person = %update.person, "saved note");
        Ok(())
    }

    /// [`save`](Self::save) followed by a fresh [`fetch_book`](Self::fetch_book).
    pub async fn save_and_refresh(&self, update: &NoteUpdate) -> Result<NotesBook, NotesError> {
        self.save(update).await?;
        self.fetch_book().await
    }
}
