//! NoteHub client core
//!
//! Headless front-end core for a note-taking app backed by a remote notes
//! service:
//! - Query cache keyed by (kind, search, page) with deduplication,
//!   invalidation and hydration
//! - Notes list controller with debounced search and pagination
//! - Note creation form with a validation schema, hosted in a modal
//! - HTTP client for the notes service

pub mod api;
pub mod notes;
pub mod query;
pub mod telemetry;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::notes::NotesPage;
use crate::query::{CacheOptions, DehydratedState, QueryCache};

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub api: ApiYamlConfig,
    pub cache: CacheYamlConfig,
    pub ui: UiYamlConfig,
}

/// Notes service section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiYamlConfig {
    pub url: String,
    pub per_page: u32,
    pub request_timeout_secs: u64,
}

impl Default for ApiYamlConfig {
    fn default() -> Self {
        Self {
            url: "https://notehub-public.goit.study/api".into(),
            per_page: api::DEFAULT_PER_PAGE,
            request_timeout_secs: 10,
        }
    }
}

/// Query cache section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheYamlConfig {
    pub stale_time_secs: u64,
    pub gc_time_secs: u64,
    pub max_entries: u64,
}

impl Default for CacheYamlConfig {
    fn default() -> Self {
        Self {
            stale_time_secs: 60,
            gc_time_secs: 300,
            max_entries: 256,
        }
    }
}

/// UI behaviour section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiYamlConfig {
    pub search_debounce_ms: u64,
}

impl Default for UiYamlConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 300,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub per_page: u32,
    pub request_timeout_secs: u64,
    pub search_debounce_ms: u64,
    pub stale_time_secs: u64,
    pub gc_time_secs: u64,
    pub max_cache_entries: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_yaml(YamlConfig::default())
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.parse().ok())
}

impl Config {
    /// Load `.env`, then configuration from `notehub.yaml` (if present) and
    /// env vars. Equivalent to `from_yaml_and_env(None)`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "notehub.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);
        let defaults = Self::from_yaml(yaml);

        Ok(Self {
            api_url: std::env::var("NOTEHUB_API_URL").unwrap_or(defaults.api_url),
            per_page: env_parse("NOTEHUB_PER_PAGE").unwrap_or(defaults.per_page),
            request_timeout_secs: env_parse("NOTEHUB_REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
            search_debounce_ms: env_parse("NOTEHUB_DEBOUNCE_MS")
                .unwrap_or(defaults.search_debounce_ms),
            stale_time_secs: env_parse("NOTEHUB_STALE_TIME_SECS")
                .unwrap_or(defaults.stale_time_secs),
            gc_time_secs: env_parse("NOTEHUB_GC_TIME_SECS").unwrap_or(defaults.gc_time_secs),
            max_cache_entries: defaults.max_cache_entries,
        })
    }

    fn from_yaml(yaml: YamlConfig) -> Self {
        Self {
            api_url: yaml.api.url,
            per_page: yaml.api.per_page,
            request_timeout_secs: yaml.api.request_timeout_secs,
            search_debounce_ms: yaml.ui.search_debounce_ms,
            stale_time_secs: yaml.cache.stale_time_secs,
            gc_time_secs: yaml.cache.gc_time_secs,
            max_cache_entries: yaml.cache.max_entries,
        }
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("notehub.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }

    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            stale_time: Duration::from_secs(self.stale_time_secs),
            gc_time: Duration::from_secs(self.gc_time_secs),
            max_entries: self.max_cache_entries,
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

/// Shared application state: one notes service and one query cache for the
/// whole process
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn api::NotesService>,
    pub cache: QueryCache<NotesPage>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Create application state talking to the configured notes service
    pub fn new(config: Config) -> Result<Self> {
        let service = Arc::new(api::HttpNotesService::from_config(&config)?);
        Ok(Self::with_service(config, service))
    }

    /// Create application state around any notes service implementation
    pub fn with_service(config: Config, service: Arc<dyn api::NotesService>) -> Self {
        Self {
            service,
            cache: QueryCache::new(config.cache_options()),
            config: Arc::new(config),
        }
    }

    /// Seed the cache with a snapshot produced by the rendering host
    pub fn hydrate(&self, snapshot: DehydratedState<NotesPage>) -> usize {
        self.cache.hydrate(snapshot)
    }

    /// Build a notes screen bound to this state. Requires a tokio runtime.
    pub fn screen(&self) -> ui::NotesScreen {
        ui::NotesScreen::new(
            Arc::clone(&self.service),
            self.cache.clone(),
            self.config.search_debounce(),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
