//! Axum route handlers for the Generation API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::extractor::{extract_resume, ResumeRecord};
use crate::generation::service::{CoverLetterStyle, JobPosting};
use crate::generation::sessions::{CoverLetterSession, SharedSession};
use crate::generation::tone::Tone;
use crate::generation::workflow::{DraftBundle, DraftVersion, FinalDocument, WorkflowState};
use crate::state::AppState;

const DEFAULT_QUESTION_COUNT: u32 = 5;
const MAX_QUESTION_COUNT: u32 = 20;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateCoverLetterRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct SingleLetterRequest {
    pub resume_text: String,
    pub job_description: String,
    #[serde(default = "default_letter_style")]
    pub style: CoverLetterStyle,
}

fn default_letter_style() -> CoverLetterStyle {
    CoverLetterStyle::Standard
}

#[derive(Debug, Serialize)]
pub struct SingleLetterResponse {
    pub style: CoverLetterStyle,
    pub cover_letter: String,
}

#[derive(Debug, Serialize)]
pub struct SessionStateResponse {
    pub id: Uuid,
    pub state: WorkflowState,
}

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    pub target: String,
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub tone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FinalizeRequest {
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub state: WorkflowState,
    pub resume: ResumeRecord,
    pub drafts: Option<DraftBundle>,
    pub final_document: Option<FinalDocument>,
}

impl From<&CoverLetterSession> for CoverLetterView {
    fn from(session: &CoverLetterSession) -> Self {
        Self {
            id: session.id,
            created_at: session.created_at,
            state: session.workflow.state(),
            resume: session.resume.clone(),
            drafts: session.workflow.drafts().cloned(),
            final_document: session.workflow.final_document().cloned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefineResponse {
    /// False when the composed instruction was empty and nothing was sent.
    pub applied: bool,
    pub session: CoverLetterView,
}

#[derive(Debug, Deserialize)]
pub struct InterviewQaRequest {
    pub resume_text: String,
    pub job_description: String,
    #[serde(default = "default_question_count")]
    pub num_questions: u32,
}

fn default_question_count() -> u32 {
    DEFAULT_QUESTION_COUNT
}

#[derive(Debug, Serialize)]
pub struct InterviewQaResponse {
    pub num_questions: u32,
    /// Markdown numbered list of question/answer pairs.
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ExtractJobsRequest {
    pub page_text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractJobsResponse {
    pub postings: Vec<JobPosting>,
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

async fn find_session(state: &AppState, id: Uuid) -> Result<SharedSession, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Cover letter session {id} not found"))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/cover-letters
///
/// Starts a session and generates both drafts. The session is stored only
/// once both drafts exist.
pub async fn handle_create_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<CreateCoverLetterRequest>,
) -> Result<(StatusCode, Json<CoverLetterView>), AppError> {
    require_text("resume_text", &request.resume_text)?;
    require_text("job_description", &request.job_description)?;

    let resume = extract_resume(&request.resume_text, &state.vocabulary);
    let mut session = CoverLetterSession::new(resume, request.job_description);
    session
        .workflow
        .generate(
            state.generator.as_ref(),
            &session.resume,
            &session.job_description,
        )
        .await?;

    let view = CoverLetterView::from(&session);
    let id = state.sessions.insert(session).await;
    info!("Cover letter session {id} drafted");

    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/cover-letters/:id
pub async fn handle_get_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CoverLetterView>, AppError> {
    let shared = find_session(&state, id).await?;
    let session = shared.lock().await;
    Ok(Json(CoverLetterView::from(&*session)))
}

/// GET /api/v1/cover-letters/:id/state
///
/// Answers without waiting for the session lock, so a refine in progress
/// shows up as `REFINING`.
pub async fn handle_get_cover_letter_state(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionStateResponse>, AppError> {
    let workflow_state = state
        .sessions
        .state(id)
        .await
        .ok_or_else(|| session_not_found(id))?;

    Ok(Json(SessionStateResponse {
        id,
        state: workflow_state,
    }))
}

/// DELETE /api/v1/cover-letters/:id
pub async fn handle_delete_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(id).await {
        return Err(session_not_found(id));
    }
    info!("Cover letter session {id} deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/cover-letters/:id/refine
pub async fn handle_refine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RefineRequest>,
) -> Result<Json<RefineResponse>, AppError> {
    let target: DraftVersion = request.target.parse()?;
    let tone = request
        .tone
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(str::parse::<Tone>)
        .transpose()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let shared = find_session(&state, id).await?;
    let mut session = shared.lock().await;
    let applied = session
        .workflow
        .refine(state.generator.as_ref(), target, &request.instruction, tone)
        .await?
        .is_some();

    Ok(Json(RefineResponse {
        applied,
        session: CoverLetterView::from(&*session),
    }))
}

/// POST /api/v1/cover-letters/:id/finalize
pub async fn handle_finalize(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<FinalizeRequest>,
) -> Result<Json<CoverLetterView>, AppError> {
    let version: DraftVersion = request.version.parse()?;

    let shared = find_session(&state, id).await?;
    let mut session = shared.lock().await;
    session.workflow.finalize(version)?;

    Ok(Json(CoverLetterView::from(&*session)))
}

/// POST /api/v1/letters
///
/// Writes one cover letter in the requested style (default `standard`)
/// without starting a session.
pub async fn handle_single_letter(
    State(state): State<AppState>,
    Json(request): Json<SingleLetterRequest>,
) -> Result<Json<SingleLetterResponse>, AppError> {
    require_text("resume_text", &request.resume_text)?;
    require_text("job_description", &request.job_description)?;

    let resume = extract_resume(&request.resume_text, &state.vocabulary);
    let cover_letter = state
        .generator
        .generate_cover_letter(&resume, &request.job_description, request.style)
        .await?;

    Ok(Json(SingleLetterResponse {
        style: request.style,
        cover_letter,
    }))
}

/// POST /api/v1/interview-qa
pub async fn handle_interview_qa(
    State(state): State<AppState>,
    Json(request): Json<InterviewQaRequest>,
) -> Result<Json<InterviewQaResponse>, AppError> {
    require_text("resume_text", &request.resume_text)?;
    require_text("job_description", &request.job_description)?;
    if !(1..=MAX_QUESTION_COUNT).contains(&request.num_questions) {
        return Err(AppError::Validation(format!(
            "num_questions must be between 1 and {MAX_QUESTION_COUNT}"
        )));
    }

    let resume = extract_resume(&request.resume_text, &state.vocabulary);
    let content = state
        .generator
        .generate_interview_qa(&resume, &request.job_description, request.num_questions)
        .await?;

    Ok(Json(InterviewQaResponse {
        num_questions: request.num_questions,
        content,
    }))
}

/// POST /api/v1/jobs/extract
///
/// Turns scraped careers-page text into structured job postings.
pub async fn handle_extract_jobs(
    State(state): State<AppState>,
    Json(request): Json<ExtractJobsRequest>,
) -> Result<Json<ExtractJobsResponse>, AppError> {
    require_text("page_text", &request.page_text)?;

    let postings = state
        .generator
        .extract_job_postings(&request.page_text)
        .await?;
    info!("Extracted {} job postings", postings.len());

    Ok(Json(ExtractJobsResponse { postings }))
}
