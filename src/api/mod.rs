//! Notes service client
//!
//! [`NotesService`] is the seam between the front-end core and the remote
//! API; [`HttpNotesService`] talks to the real service over HTTP/JSON.

pub mod client;
pub mod query;
pub mod traits;

pub use client::{HttpNotesService, ServiceError};
pub use query::{ListNotesParams, DEFAULT_PER_PAGE};
pub use traits::NotesService;

#[cfg(test)]
pub(crate) mod mock;
