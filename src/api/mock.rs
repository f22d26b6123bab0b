//! In-memory mock implementation of NotesService for testing without a
//! running notes service.

use super::query::DEFAULT_PER_PAGE;
use super::traits::NotesService;
use crate::notes::{Note, NoteTag, NotesPage};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory notes service.
///
/// Notes are kept newest-first. Search is a case-insensitive substring match
/// over title and content. Call counters and failure switches let tests
/// assert on network traffic.
pub struct MockNotesService {
    notes: RwLock<Vec<Note>>,
    per_page: u32,
    /// Artificial latency per search term, for ordering tests
    latency: RwLock<HashMap<String, Duration>>,
    create_latency: RwLock<Option<Duration>>,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub fail_lists: AtomicBool,
    pub fail_creates: AtomicBool,
}

impl MockNotesService {
    pub fn new() -> Self {
        Self::with_per_page(DEFAULT_PER_PAGE)
    }

    pub fn with_per_page(per_page: u32) -> Self {
        Self {
            notes: RwLock::new(Vec::new()),
            per_page: per_page.max(1),
            latency: RwLock::new(HashMap::new()),
            create_latency: RwLock::new(None),
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            fail_lists: AtomicBool::new(false),
            fail_creates: AtomicBool::new(false),
        }
    }

    /// Seed notes (appended after existing ones, i.e. older)
    pub async fn seed(&self, notes: impl IntoIterator<Item = Note>) {
        self.notes.write().await.extend(notes);
    }

    pub async fn set_latency(&self, search: &str, latency: Duration) {
        self.latency
            .write()
            .await
            .insert(search.to_string(), latency);
    }

    pub async fn set_create_latency(&self, latency: Option<Duration>) {
        *self.create_latency.write().await = latency;
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.notes.read().await.len()
    }
}

impl Default for MockNotesService {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(note: &Note, search: &str) -> bool {
    let query = search.trim().to_lowercase();
    query.is_empty()
        || note.title.to_lowercase().contains(&query)
        || note.content.to_lowercase().contains(&query)
}

#[async_trait]
impl NotesService for MockNotesService {
    async fn list_notes(&self, search: &str, page: u32) -> Result<NotesPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(anyhow!("mock list failure"));
        }

        // Snapshot at request time; latency only delays the response
        let snapshot = {
            let notes = self.notes.read().await;
            let matching: Vec<&Note> = notes.iter().filter(|n| matches(n, search)).collect();
            let per_page = self.per_page as usize;
            let total_pages = matching.len().div_ceil(per_page) as u32;
            let start = (page.max(1) as usize - 1) * per_page;
            NotesPage {
                notes: matching
                    .into_iter()
                    .skip(start)
                    .take(per_page)
                    .cloned()
                    .collect(),
                total_pages,
            }
        };

        let latency = self.latency.read().await.get(search).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        Ok(snapshot)
    }

    async fn get_note(&self, id: &str) -> Result<Note> {
        self.notes
            .read()
            .await
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("note not found: {}", id))
    }

    async fn create_note(&self, title: &str, content: Option<&str>, tag: NoteTag) -> Result<Note> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let latency = *self.create_latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(anyhow!("mock create failure"));
        }
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: content.unwrap_or_default().to_string(),
            tag,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.notes.write().await.insert(0, note.clone());
        Ok(note)
    }

    async fn delete_note(&self, id: &str) -> Result<Note> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut notes = self.notes.write().await;
        let pos = notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| anyhow!("note not found: {}", id))?;
        Ok(notes.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::test_note;

    #[tokio::test]
    async fn test_list_paginates_and_searches() {
        let svc = MockNotesService::with_per_page(2);
        svc.seed((1..=5).map(|i| test_note(&format!("Note {}", i), NoteTag::Work)))
            .await;
        svc.seed([test_note("Buy milk", NoteTag::Shopping)]).await;

        let page = svc.list_notes("", 1).await.unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.notes.len(), 2);

        let last = svc.list_notes("", 3).await.unwrap();
        assert_eq!(last.notes.len(), 2);

        let milk = svc.list_notes("MILK", 1).await.unwrap();
        assert_eq!(milk.total_pages, 1);
        assert_eq!(milk.notes[0].title, "Buy milk");

        let none = svc.list_notes("nothing", 1).await.unwrap();
        assert_eq!(none.total_pages, 0);
        assert!(none.notes.is_empty());
        assert_eq!(svc.list_count(), 4);
    }

    #[tokio::test]
    async fn test_create_then_delete() {
        let svc = MockNotesService::new();
        let note = svc
            .create_note("Groceries", Some("Milk, eggs"), NoteTag::Shopping)
            .await
            .unwrap();
        assert_eq!(svc.get_note(&note.id).await.unwrap().title, "Groceries");

        svc.delete_note(&note.id).await.unwrap();
        assert!(svc.get_note(&note.id).await.is_err());
        assert_eq!(svc.len().await, 0);
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let svc = MockNotesService::new();
        svc.fail_lists.store(true, Ordering::SeqCst);
        svc.fail_creates.store(true, Ordering::SeqCst);
        assert!(svc.list_notes("", 1).await.is_err());
        assert!(svc.create_note("Title", None, NoteTag::Todo).await.is_err());
        assert_eq!(svc.create_count(), 1);
    }
}
