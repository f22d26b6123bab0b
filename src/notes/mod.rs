//! Notes domain module
//!
//! Note data as exchanged with the notes service, plus the validation schema
//! applied to the note creation form before anything is sent.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::{validate, validate_field, FieldErrors, FormField};
