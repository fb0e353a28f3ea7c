use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::core::shared::utils::DbPool;
use crate::explorer::{KeywordSentimentScorer, SentimentScorer, SnapshotCache};

/// Shared per-process state handed to every handler as `State<Arc<AppState>>`.
#[derive(Clone)]
pub struct AppState {
    pub conn: DbPool,
    pub config: AppConfig,
    pub explorer: SnapshotCache,
    pub scorer: Arc<dyn SentimentScorer>,
}

impl AppState {
    pub fn new(conn: DbPool, config: AppConfig) -> Self {
        Self {
            conn,
            config,
            explorer: SnapshotCache::default(),
            scorer: Arc::new(KeywordSentimentScorer),
        }
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn SentimentScorer>) -> Self {
        self.scorer = scorer;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("pool_state", &self.conn.state())
            .finish_non_exhaustive()
    }
}
