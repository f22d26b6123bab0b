//! Note creation form controller
//!
//! ```text
//! Editing ──submit (valid)──► Submitting ──ok──► Closed
//!    ▲                            │
//!    └──────────── error ─────────┘
//! Editing ──cancel──► Closed
//! ```

use crate::api::NotesService;
use crate::notes::{
    validate, validate_field, FieldErrors, FormField, Note, NoteFormValues, NoteTag, NotesPage,
};
use crate::query::{EntityKind, QueryCache, QueryFilter};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Editing,
    Submitting,
    Closed,
}

/// Result of a submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Note created; the form is closed
    Created(Note),
    /// Validation failed; nothing was sent
    Invalid(FieldErrors),
    /// The service rejected the request; values are kept for a retry
    Failed(String),
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("no note form is open")]
    NotOpen,
    #[error("note form is {0:?}, not editing")]
    NotEditing(FormStatus),
}

/// Holds the form in `Submitting` and puts it back to `Editing` when
/// dropped, including when the submit future is dropped mid-request.
struct SubmittingGuard<'a> {
    status: &'a mut FormStatus,
}

impl<'a> SubmittingGuard<'a> {
    fn enter(status: &'a mut FormStatus) -> Self {
        *status = FormStatus::Submitting;
        Self { status }
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        *self.status = FormStatus::Editing;
    }
}

/// State of one note creation form
#[derive(Debug, Clone)]
pub struct NoteForm {
    values: NoteFormValues,
    errors: FieldErrors,
    status: FormStatus,
    mutation_error: Option<String>,
}

impl Default for NoteForm {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteForm {
    pub fn new() -> Self {
        Self {
            values: NoteFormValues::default(),
            errors: FieldErrors::new(),
            status: FormStatus::Editing,
            mutation_error: None,
        }
    }

    pub fn values(&self) -> &NoteFormValues {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn is_closed(&self) -> bool {
        self.status == FormStatus::Closed
    }

    /// Error from the last failed create request
    pub fn mutation_error(&self) -> Option<&str> {
        self.mutation_error.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.values.title = title.into();
        self.revalidate(FormField::Title);
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.values.content = content.into();
        self.revalidate(FormField::Content);
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.values.tag = tag.into();
        self.revalidate(FormField::Tag);
    }

    fn revalidate(&mut self, field: FormField) {
        match validate_field(field, &self.values) {
            Some(message) => {
                self.errors.insert(field, message);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }

    /// Validate and, if valid, create the note.
    ///
    /// On success every cached notes list is invalidated (refetch happens in
    /// the background), the fields are reset and the form closes.
    pub async fn submit(
        &mut self,
        service: &dyn NotesService,
        cache: &QueryCache<NotesPage>,
    ) -> Result<SubmitOutcome, FormError> {
        if self.status != FormStatus::Editing {
            return Err(FormError::NotEditing(self.status));
        }

        self.errors = validate(&self.values);
        if !self.errors.is_empty() {
            return Ok(SubmitOutcome::Invalid(self.errors.clone()));
        }
        let tag: NoteTag = match self.values.tag.parse() {
            Ok(tag) => tag,
            Err(e) => return Ok(SubmitOutcome::Invalid(FieldErrors::from([(FormField::Tag, e)]))),
        };

        self.mutation_error = None;
        let result = {
            let _submitting = SubmittingGuard::enter(&mut self.status);
            service
                .create_note(self.values.title.trim(), self.values.content_or_none(), tag)
                .await
        };

        match result {
            Ok(note) => {
                info!(id = %note.id, "Note form submitted");
                cache.invalidate(&QueryFilter::Kind(EntityKind::Notes));
                self.reset();
                self.status = FormStatus::Closed;
                Ok(SubmitOutcome::Created(note))
            }
            Err(e) => {
                let message = format!("{:#}", e);
                warn!(error = %message, "Note creation failed");
                self.mutation_error = Some(message.clone());
                Ok(SubmitOutcome::Failed(message))
            }
        }
    }

    /// Discard edits and close without sending anything
    pub fn cancel(&mut self) {
        self.reset();
        self.status = FormStatus::Closed;
    }

    fn reset(&mut self) {
        self.values = NoteFormValues::default();
        self.errors.clear();
        self.mutation_error = None;
    }
}
