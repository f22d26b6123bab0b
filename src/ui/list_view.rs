//! Notes list controller: search text, current page, and the query they
//! select.

use crate::api::NotesService;
use crate::notes::{Note, NotesPage};
use crate::query::{
    query_fn, EntityKind, QueryCache, QueryFilter, QueryKey, QueryObserver, QueryState,
};
use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("page {requested} is out of range (1..={total_pages})")]
    PageOutOfRange { requested: u32, total_pages: u32 },
}

/// What the list slot shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSlot {
    /// No data yet for this search
    Loading,
    /// First fetch failed and there is nothing to show
    Failed { message: String },
    /// No search and the service has no notes
    Empty,
    /// The search matched nothing
    NoMatches { query: String },
    Notes(Vec<Note>),
}

/// Pagination control state; only present when there is more than one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationModel {
    pub total_pages: u32,
    pub current_page: u32,
}

/// Everything a host needs to draw the list area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesViewModel {
    pub search_query: String,
    pub list: ListSlot,
    pub pagination: Option<PaginationModel>,
    pub is_fetching: bool,
    /// The notes shown belong to the previous search/page
    pub is_placeholder: bool,
    /// Last fetch error, shown alongside any stale data
    pub error: Option<String>,
}

/// Owns `search_query` and `current_page`, and keeps the cache key
/// `(notes, search_query, current_page)` in sync with them.
pub struct NotesListView {
    service: Arc<dyn NotesService>,
    observer: QueryObserver<NotesPage>,
    search_query: String,
    current_page: u32,
}

impl NotesListView {
    pub fn new(service: Arc<dyn NotesService>, cache: QueryCache<NotesPage>) -> Self {
        let observer = QueryObserver::new(cache, QueryKey::notes("", 1), true);
        Self {
            service,
            observer,
            search_query: String::new(),
            current_page: 1,
        }
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::notes(self.search_query.clone(), self.current_page)
    }

    pub fn cache(&self) -> &QueryCache<NotesPage> {
        self.observer.cache()
    }

    /// Commit a search. Always resets to page 1.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.current_page = 1;
        self.observer.set_key(self.key());
        debug!(search = %self.search_query, "Search changed");
    }

    /// Total pages of the result currently shown (0 when nothing is loaded)
    pub fn total_pages(&mut self) -> u32 {
        self.observer
            .current()
            .data
            .map_or(0, |page| page.total_pages)
    }

    /// Go to page `page`. Rejected unless `1 <= page <= total_pages`.
    pub fn set_page(&mut self, page: u32) -> Result<(), ViewError> {
        let total_pages = self.total_pages();
        if page < 1 || page > total_pages {
            return Err(ViewError::PageOutOfRange {
                requested: page,
                total_pages,
            });
        }
        self.current_page = page;
        self.observer.set_key(self.key());
        Ok(())
    }

    /// Fetch (or serve from cache) the current search/page
    pub async fn refresh(&mut self) -> QueryState<NotesPage> {
        let service = Arc::clone(&self.service);
        let search = self.search_query.clone();
        let page = self.current_page;
        let fetcher = query_fn(move || {
            let service = Arc::clone(&service);
            let search = search.clone();
            async move { service.list_notes(&search, page).await }
        });
        self.observer.fetch(fetcher).await
    }

    /// Delete a note and invalidate every cached notes list
    pub async fn delete_note(&mut self, id: &str) -> Result<Note> {
        let note = self.service.delete_note(id).await?;
        self.cache().invalidate(&QueryFilter::Kind(EntityKind::Notes));
        Ok(note)
    }

    /// Current view model, without fetching
    pub fn view(&mut self) -> NotesViewModel {
        let state = self.observer.current();
        let total_pages = state.data.as_ref().map_or(0, |page| page.total_pages);

        let list = match (&state.data, &state.error) {
            (Some(page), _) if !page.is_empty() => ListSlot::Notes(page.notes.clone()),
            (Some(_), _) if self.search_query.is_empty() => ListSlot::Empty,
            (Some(_), _) => ListSlot::NoMatches {
                query: self.search_query.clone(),
            },
            (None, Some(err)) => ListSlot::Failed {
                message: err.message().to_string(),
            },
            (None, None) => ListSlot::Loading,
        };

        NotesViewModel {
            search_query: self.search_query.clone(),
            list,
            pagination: (total_pages > 1).then_some(PaginationModel {
                total_pages,
                current_page: self.current_page,
            }),
            is_fetching: state.is_fetching,
            is_placeholder: state.is_placeholder,
            error: state.error.map(|e| e.message().to_string()),
        }
    }
}
