use std::sync::Arc;

use crate::config::Config;
use crate::scoring::models::{default_adjacencies, SkillAdjacency};
use crate::scoring::SemanticScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable semantic scorer. Default: KeywordOverlapScorer.
    /// LlmSemanticScorer when an API key is set.
    pub semantic: Arc<dyn SemanticScorer>,
    /// Published adjacency table jobs can start from.
    pub default_adjacencies: Vec<SkillAdjacency>,
}

impl AppState {
    pub fn new(config: Config, semantic: Arc<dyn SemanticScorer>) -> Self {
        Self {
            config,
            semantic,
            default_adjacencies: default_adjacencies(),
        }
    }
}
