//! Trait abstraction for the remote notes service

use crate::notes::{Note, NoteTag, NotesPage};
use anyhow::Result;
use async_trait::async_trait;

/// Operations the front-end needs from the notes service.
///
/// Implemented over HTTP by [`HttpNotesService`](super::HttpNotesService);
/// tests use an in-memory mock.
#[async_trait]
pub trait NotesService: Send + Sync {
    /// One page of notes matching `search` (empty = no filter). Pages are 1-based.
    async fn list_notes(&self, search: &str, page: u32) -> Result<NotesPage>;

    /// Fetch a single note by ID
    async fn get_note(&self, id: &str) -> Result<Note>;

    /// Create a note. `content: None` is sent as `null`.
    async fn create_note(&self, title: &str, content: Option<&str>, tag: NoteTag) -> Result<Note>;

    /// Delete a note, returning the deleted note
    async fn delete_note(&self, id: &str) -> Result<Note>;
}
