//! Axum route handlers for the Analysis API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::pipeline::{analyze, Analysis};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub resume_text: String,
    pub job_description: String,
}

/// POST /api/v1/analysis
///
/// Extracts résumé and job skills, matches and scores them. Empty text is
/// allowed and yields empty results.
pub async fn handle_analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Json<Analysis> {
    Json(analyze(
        &request.resume_text,
        &request.job_description,
        &state.vocabulary,
        state.scorer.as_ref(),
    ))
}

#[derive(Debug, Serialize)]
pub struct SkillListResponse {
    pub skills: Vec<String>,
}

/// GET /api/v1/skills
///
/// Lists the canonical skill phrases the extractor looks for, in vocabulary order.
pub async fn handle_list_skills(State(state): State<AppState>) -> Json<SkillListResponse> {
    Json(SkillListResponse {
        skills: state
            .vocabulary
            .iter()
            .map(|phrase| phrase.canonical.clone())
            .collect(),
    })
}
