//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::db::AppConfig;
use crate::ingest::IngestionPipeline;
use crate::services::ConformanceMatcher;

const DEFAULT_PAGE_SIZE: usize = 20;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    pub pipeline: IngestionPipeline,
    pub matcher: ConformanceMatcher,
    /// Guideline search page size
    pub page_size: usize,
}

impl AppState {
    /// Create a new application state with the given repository and defaults.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            pipeline: IngestionPipeline::new(Arc::clone(&repository)),
            repository,
            matcher: ConformanceMatcher::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Apply the validation rules and page size from a loaded config.
    pub fn from_config(repository: Arc<dyn FullRepository>, config: &AppConfig) -> Self {
        let mut state = Self::new(repository);
        state.pipeline = state.pipeline.with_rules(config.validation.clone());
        state.page_size = config.guidelines.page_size;
        state
    }

    pub fn with_pipeline(mut self, pipeline: IngestionPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_matcher(mut self, matcher: ConformanceMatcher) -> Self {
        self.matcher = matcher;
        self
    }
}
