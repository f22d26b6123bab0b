//! Test helper factories
//!
//! Provides convenience functions for creating test objects with sensible defaults.
#![allow(dead_code)]

use crate::notes::{Note, NoteTag, NotesPage};
use crate::query::{CacheOptions, QueryCache};
use chrono::Utc;
use uuid::Uuid;

/// Create a note with a random ID
pub fn test_note(title: &str, tag: NoteTag) -> Note {
    let now = Utc::now();
    Note {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        content: format!("Body of {}", title),
        tag,
        created_at: Some(now),
        updated_at: Some(now),
    }
}

/// Fresh cache with default options
pub fn test_cache() -> QueryCache<NotesPage> {
    QueryCache::new(CacheOptions::default())
}
