//! Modal that hosts the note creation form

use super::form::{FormError, NoteForm, SubmitOutcome};
use crate::api::NotesService;
use crate::notes::NotesPage;
use crate::query::QueryCache;

/// `closed --open()--> open --close()--> closed`.
///
/// While open the modal owns exactly one [`NoteForm`]; closing drops it, so
/// a half-filled form never survives to the next opening.
#[derive(Debug, Default)]
pub struct NoteModal {
    form: Option<NoteForm>,
}

impl NoteModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.form.is_some()
    }

    /// Open with a fresh form. Opening an open modal keeps its form.
    pub fn open(&mut self) -> &mut NoteForm {
        self.form.get_or_insert_with(NoteForm::new)
    }

    pub fn close(&mut self) {
        self.form = None;
    }

    pub fn form(&self) -> Option<&NoteForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut NoteForm> {
        self.form.as_mut()
    }

    /// Submit the open form; closes the modal when the note was created
    pub async fn submit(
        &mut self,
        service: &dyn NotesService,
        cache: &QueryCache<NotesPage>,
    ) -> Result<SubmitOutcome, FormError> {
        let form = self.form.as_mut().ok_or(FormError::NotOpen)?;
        let outcome = form.submit(service, cache).await?;
        if form.is_closed() {
            self.form = None;
        }
        Ok(outcome)
    }

    /// Cancel the open form and close
    pub fn cancel(&mut self) {
        if let Some(form) = self.form.as_mut() {
            form.cancel();
        }
        self.form = None;
    }
}
