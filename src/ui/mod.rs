//! Headless UI controllers
//!
//! State machines a rendering host drives with method calls and reads back
//! as plain view models.
//!
//! ## Modules
//!
//! - [`list_view`]: `NotesListView`: search + page → query key → view model
//! - [`debouncer`]: `SearchDebouncer`: coalesces keystrokes into one search
//! - [`form`]: `NoteForm`: field state, validation, create mutation
//! - [`modal`]: `NoteModal`: open/closed, owns the form
//! - [`screen`]: `NotesScreen`: everything above wired together

pub mod debouncer;
pub mod form;
pub mod list_view;
pub mod modal;
pub mod screen;

pub use debouncer::{SearchDebouncer, DEFAULT_SEARCH_DEBOUNCE};
pub use form::{FormError, FormStatus, NoteForm, SubmitOutcome};
pub use list_view::{ListSlot, NotesListView, NotesViewModel, PaginationModel, ViewError};
pub use modal::NoteModal;
pub use screen::{NotesScreen, ScreenModel};
