//! HTTP client for the notes service

use super::query::ListNotesParams;
use super::traits::NotesService;
use crate::notes::{CreateNoteRequest, Note, NoteTag, NotesPage};
use crate::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Non-transport failures reported by the notes service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("notes service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("note not found: {0}")]
    NotFound(String),
}

/// [`NotesService`] over HTTP/JSON
#[derive(Debug, Clone)]
pub struct HttpNotesService {
    client: Client,
    base_url: String,
    per_page: u32,
}

impl HttpNotesService {
    /// Create a client for the service rooted at `base_url` (e.g.
    /// `https://host/api`).
    pub fn new(base_url: &str, per_page: u32, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            per_page,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.api_url,
            config.per_page,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn note_url(&self, id: &str) -> String {
        format!("{}/notes/{}", self.base_url, id)
    }

    /// Turn a non-2xx response into an error, otherwise decode the body
    async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound(what.to_string()).into());
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status, body }.into());
        }
        resp.json::<T>()
            .await
            .with_context(|| format!("Failed to decode {}", what))
    }
}

#[async_trait]
impl NotesService for HttpNotesService {
    async fn list_notes(&self, search: &str, page: u32) -> Result<NotesPage> {
        let params = ListNotesParams::new(search, page, self.per_page);
        debug!(search = %search, page, "Listing notes");
        let resp = self
            .client
            .get(format!("{}/notes", self.base_url))
            .query(&params)
            .send()
            .await
            .context("Failed to list notes")?;
        Self::decode(resp, "notes list").await
    }

    async fn get_note(&self, id: &str) -> Result<Note> {
        let resp = self
            .client
            .get(self.note_url(id))
            .send()
            .await
            .with_context(|| format!("Failed to fetch note {}", id))?;
        Self::decode(resp, id).await
    }

    async fn create_note(&self, title: &str, content: Option<&str>, tag: NoteTag) -> Result<Note> {
        let body = CreateNoteRequest {
            title,
            content,
            tag,
        };
        let resp = self
            .client
            .post(format!("{}/notes", self.base_url))
            .json(&body)
            .send()
            .await
            .context("Failed to create note")?;
        let note: Note = Self::decode(resp, "created note").await?;
        info!(id = %note.id, tag = %note.tag, "Note created");
        Ok(note)
    }

    async fn delete_note(&self, id: &str) -> Result<Note> {
        let resp = self
            .client
            .delete(self.note_url(id))
            .send()
            .await
            .with_context(|| format!("Failed to delete note {}", id))?;
        let note: Note = Self::decode(resp, id).await?;
        info!(id = %note.id, "Note deleted");
        Ok(note)
    }
}
