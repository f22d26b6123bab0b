//! Query string parameters for the notes list endpoint

use serde::Serialize;

/// Default page size used by the notes service front-end
pub const DEFAULT_PER_PAGE: u32 = 12;

/// Upper bound the service accepts for `perPage`
pub const MAX_PER_PAGE: u32 = 50;

/// Parameters for `GET /notes`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListNotesParams {
    /// Omitted from the query string when there is no search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl ListNotesParams {
    /// Build parameters, dropping a blank search and clamping page/per_page
    /// into the ranges the service accepts.
    pub fn new(search: &str, page: u32, per_page: u32) -> Self {
        let search = search.trim();
        Self {
            search: (!search.is_empty()).then(|| search.to_string()),
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }
}
