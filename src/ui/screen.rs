//! Notes screen: search box, list, pagination and create-note modal wired
//! together

use super::debouncer::SearchDebouncer;
use super::form::{FormError, NoteForm, SubmitOutcome};
use super::list_view::{NotesListView, NotesViewModel, ViewError};
use super::modal::NoteModal;
use crate::api::NotesService;
use crate::notes::NotesPage;
use crate::query::{QueryCache, QueryState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Everything a host needs to draw the screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenModel {
    pub list: NotesViewModel,
    pub modal_open: bool,
}

/// The notes screen.
///
/// Search input goes through a [`SearchDebouncer`]; committed searches are
/// queued and applied by [`next_search_commit`](Self::next_search_commit),
/// which the host awaits in its event loop. Dropping the screen cancels any
/// pending search.
pub struct NotesScreen {
    service: Arc<dyn NotesService>,
    cache: QueryCache<NotesPage>,
    list: NotesListView,
    modal: NoteModal,
    debouncer: SearchDebouncer,
    commits: mpsc::UnboundedReceiver<String>,
}

impl NotesScreen {
    /// Must be called inside a tokio runtime (the debouncer spawns a task)
    pub fn new(
        service: Arc<dyn NotesService>,
        cache: QueryCache<NotesPage>,
        search_debounce: Duration,
    ) -> Self {
        let (tx, commits) = mpsc::unbounded_channel();
        let debouncer = SearchDebouncer::new(search_debounce, move |query| {
            let _ = tx.send(query);
        });
        Self {
            list: NotesListView::new(Arc::clone(&service), cache.clone()),
            service,
            cache,
            modal: NoteModal::new(),
            debouncer,
            commits,
        }
    }

    pub fn list(&self) -> &NotesListView {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut NotesListView {
        &mut self.list
    }

    pub fn modal(&self) -> &NoteModal {
        &self.modal
    }

    /// Raw keystroke-level search input
    pub fn on_search_input(&self, query: impl Into<String>) {
        self.debouncer.schedule(query);
    }

    /// Wait for the next committed search and apply it to the list.
    /// Returns `None` once the debouncer is gone.
    pub async fn next_search_commit(&mut self) -> Option<String> {
        let query = self.commits.recv().await?;
        self.list.set_search(query.clone());
        Some(query)
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), ViewError> {
        self.list.set_page(page)
    }

    pub async fn refresh(&mut self) -> QueryState<NotesPage> {
        self.list.refresh().await
    }

    pub fn open_modal(&mut self) -> &mut NoteForm {
        self.modal.open()
    }

    pub fn close_modal(&mut self) {
        self.modal.close();
    }

    pub fn form_mut(&mut self) -> Option<&mut NoteForm> {
        self.modal.form_mut()
    }

    pub async fn submit_note(&mut self) -> Result<SubmitOutcome, FormError> {
        self.modal.submit(self.service.as_ref(), &self.cache).await
    }

    pub fn cancel_note(&mut self) {
        self.modal.cancel();
    }

    pub fn view(&mut self) -> ScreenModel {
        ScreenModel {
            list: self.list.view(),
            modal_open: self.modal.is_open(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockNotesService;
    use crate::notes::validation::TITLE_TOO_SHORT;
    use crate::notes::{FormField, NoteTag};
    use crate::test_helpers::{test_cache, test_note};
    use crate::ui::list_view::ListSlot;
    use crate::ui::DEFAULT_SEARCH_DEBOUNCE;

    async fn screen_with(notes: &[&str]) -> (NotesScreen, Arc<MockNotesService>) {
        let svc = Arc::new(MockNotesService::new());
        svc.seed(notes.iter().map(|t| test_note(t, NoteTag::Todo)))
            .await;
        let screen = NotesScreen::new(svc.clone(), test_cache(), DEFAULT_SEARCH_DEBOUNCE);
        (screen, svc)
    }

    fn titles(model: &ScreenModel) -> Vec<String> {
        match &model.list.list {
            ListSlot::Notes(notes) => notes.iter().map(|n| n.title.clone()).collect(),
            _ => Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_happy_path_create_shows_new_note() {
        let (mut screen, svc) = screen_with(&["Standup"]).await;
        screen.refresh().await;

        let form = screen.open_modal();
        form.set_title("Groceries");
        form.set_content("Milk, eggs");
        form.set_tag("Shopping");
        assert!(screen.view().modal_open);

        let outcome = screen.submit_note().await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Created(_)));
        assert!(!screen.view().modal_open);

        screen.refresh().await;
        let model = screen.view();
        assert!(titles(&model).contains(&"Groceries".to_string()));
        assert_eq!(svc.create_count(), 1);
    }

    #[tokio::test]
    async fn test_validation_rejection_keeps_modal_open() {
        let (mut screen, svc) = screen_with(&[]).await;
        screen.open_modal().set_title("Hi");

        let outcome = screen.submit_note().await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Invalid(_)));
        assert_eq!(svc.create_count(), 0);
        assert!(screen.view().modal_open);
        let form = screen.form_mut().unwrap();
        assert_eq!(form.error(FormField::Title), Some(TITLE_TOO_SHORT));
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_search_resets_page_and_filters() {
        let titles_in: Vec<String> = (0..20).map(|i| format!("Task {}", i)).collect();
        let refs: Vec<&str> = titles_in.iter().map(String::as_str).collect();
        let (mut screen, svc) = screen_with(&refs).await;
        svc.seed([test_note("Buy milk", NoteTag::Shopping)]).await;
        screen.refresh().await;
        screen.set_page(2).unwrap();
        screen.refresh().await;

        screen.on_search_input("m");
        tokio::time::sleep(Duration::from_millis(50)).await;
        screen.on_search_input("mil");
        tokio::time::sleep(Duration::from_millis(50)).await;
        screen.on_search_input("milk");

        let committed = screen.next_search_commit().await;
        assert_eq!(committed.as_deref(), Some("milk"));
        assert_eq!(screen.list().current_page(), 1);

        screen.refresh().await;
        assert_eq!(titles(&screen.view()), vec!["Buy milk".to_string()]);
    }

    #[tokio::test]
    async fn test_cancel_note_closes_without_request() {
        let (mut screen, svc) = screen_with(&[]).await;
        screen.open_modal().set_title("Draft");
        screen.cancel_note();
        assert!(!screen.view().modal_open);
        assert_eq!(svc.create_count(), 0);
    }
}
