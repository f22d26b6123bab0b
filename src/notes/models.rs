//! Note models and DTOs
//!
//! Notes are owned by the remote notes service. The client never mutates a
//! note locally: it submits creation/deletion requests and re-reads the
//! authoritative list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Core Enums
// ============================================================================

/// Category a note is filed under.
///
/// Serialized as the capitalized literal the service expects (`"Work"`,
/// `"Todo"`, ...).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NoteTag {
    Work,
    Personal,
    Meeting,
    Shopping,
    #[default]
    Todo,
}

impl NoteTag {
    /// Every tag, in the order a tag picker lists them
    pub const ALL: [NoteTag; 5] = [
        NoteTag::Todo,
        NoteTag::Work,
        NoteTag::Personal,
        NoteTag::Meeting,
        NoteTag::Shopping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Personal => "Personal",
            Self::Meeting => "Meeting",
            Self::Shopping => "Shopping",
            Self::Todo => "Todo",
        }
    }
}

impl fmt::Display for NoteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteTag {
    type Err = String;

    /// Exact, case-sensitive match against the five literals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Work" => Ok(Self::Work),
            "Personal" => Ok(Self::Personal),
            "Meeting" => Ok(Self::Meeting),
            "Shopping" => Ok(Self::Shopping),
            "Todo" => Ok(Self::Todo),
            _ => Err(format!("Unknown note tag: {}", s)),
        }
    }
}

// ============================================================================
// Core Structures
// ============================================================================

/// A note as returned by the notes service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    /// Empty when the note was created without content
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    pub tag: NoteTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of the notes list, as returned by `GET /notes`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotesPage {
    pub notes: Vec<Note>,
    pub total_pages: u32,
}

impl NotesPage {
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Request body for `POST /notes`
///
/// `content` is always serialized; an absent body goes over the wire as
/// `null`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateNoteRequest<'a> {
    pub title: &'a str,
    pub content: Option<&'a str>,
    pub tag: NoteTag,
}

// ============================================================================
// Form values
// ============================================================================

/// Raw values of the note creation form.
///
/// `tag` stays a string until validation so that whatever the host's picker
/// produced can be rejected with a field error instead of a type error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFormValues {
    pub title: String,
    pub content: String,
    pub tag: String,
}

impl Default for NoteFormValues {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            tag: NoteTag::default().to_string(),
        }
    }
}

impl NoteFormValues {
    /// Content to submit: `None` when the field was left blank
    pub fn content_or_none(&self) -> Option<&str> {
        if self.content.is_empty() {
            None
        } else {
            Some(self.content.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_tag_roundtrip_literals() {
        for tag in NoteTag::ALL {
            assert_eq!(tag.to_string().parse::<NoteTag>().unwrap(), tag);
        }
    }

    #[test]
    fn test_note_tag_is_case_sensitive() {
        assert!("work".parse::<NoteTag>().is_err());
        assert!("Workshop".parse::<NoteTag>().is_err());
        assert!("".parse::<NoteTag>().is_err());
    }

    #[test]
    fn test_default_tag_is_todo() {
        assert_eq!(NoteTag::default(), NoteTag::Todo);
        assert_eq!(NoteFormValues::default().tag, "Todo");
    }

    #[test]
    fn test_note_deserializes_service_payload() {
        let json = r#"{
            "id": "65f1c2",
            "title": "Groceries",
            "content": "Milk, eggs",
            "tag": "Shopping",
            "createdAt": "2025-03-01T10:00:00Z",
            "updatedAt": "2025-03-01T10:00:00Z"
        }"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.id, "65f1c2");
        assert_eq!(note.tag, NoteTag::Shopping);
        assert!(note.created_at.is_some());
    }

    #[test]
    fn test_note_null_content_becomes_empty() {
        let json = r#"{"id": "1", "title": "Standup", "content": null, "tag": "Meeting"}"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.content, "");
        assert!(note.updated_at.is_none());
    }

    #[test]
    fn test_notes_page_uses_camel_case() {
        let page: NotesPage = serde_json::from_str(r#"{"notes": [], "totalPages": 4}"#).unwrap();
        assert_eq!(page.total_pages, 4);
        assert!(page.is_empty());
    }

    #[test]
    fn test_create_request_sends_null_content() {
        let req = CreateNoteRequest {
            title: "Call mom",
            content: None,
            tag: NoteTag::Personal,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"title": "Call mom", "content": null, "tag": "Personal"})
        );
    }

    #[test]
    fn test_content_or_none() {
        let mut values = NoteFormValues::default();
        assert_eq!(values.content_or_none(), None);
        values.content = "body".into();
        assert_eq!(values.content_or_none(), Some("body"));
    }
}
