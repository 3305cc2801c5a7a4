use std::sync::Arc;

use crate::extraction::vocabulary::SkillVocabulary;
use crate::generation::service::GenerationService;
use crate::generation::sessions::SessionStore;
use crate::matching::scoring::SkillScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup, read-only afterwards.
    pub vocabulary: Arc<SkillVocabulary>,
    /// Pluggable scorer. Default: VerbatimPhraseScorer.
    pub scorer: Arc<dyn SkillScorer>,
    pub generator: Arc<dyn GenerationService>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        vocabulary: SkillVocabulary,
        scorer: Arc<dyn SkillScorer>,
        generator: Arc<dyn GenerationService>,
        sessions: SessionStore,
    ) -> Self {
        Self {
            vocabulary: Arc::new(vocabulary),
            scorer,
            generator,
            sessions,
        }
    }
}
