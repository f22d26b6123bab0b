//! Query keys and invalidation filters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of entity a cached query returns
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Notes,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Notes => write!(f, "notes"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "notes" => Ok(Self::Notes),
            _ => Err(format!("Unknown entity kind: {}", s)),
        }
    }
}

/// Address of one cached result set: `(kind, search, page)`.
///
/// Two keys are equal iff every component is equal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: EntityKind,
    pub search: String,
    pub page: u32,
}

impl QueryKey {
    /// Key for a page of the notes list. Pages are 1-based; 0 is clamped to 1.
    pub fn notes(search: impl Into<String>, page: u32) -> Self {
        Self {
            kind: EntityKind::Notes,
            search: search.into(),
            page: page.max(1),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {:?}, {}]", self.kind, self.search, self.page)
    }
}

/// Predicate over query keys, used by invalidation and removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryFilter {
    /// Every key in the cache
    All,
    /// Every search/page variant of one entity kind
    Kind(EntityKind),
    /// Exactly one key
    Exact(QueryKey),
}

impl QueryFilter {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Self::All => true,
            Self::Kind(kind) => key.kind == *kind,
            Self::Exact(exact) => key == exact,
        }
    }
}
