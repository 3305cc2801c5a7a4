//! Cover letter workflow: generate → refine → finalize.
//!
//! ```text
//! EMPTY ──generate──▶ DRAFTED ──finalize──▶ FINALIZED
//!                      │  ▲                   │  ▲
//!                      └──┘ refine            └──┘ refine / finalize
//! ```
//!
//! `REFINING` is held only while a refine call is waiting on the backend; the
//! workflow then drops back to the state it came from, including when the
//! call fails or its future is dropped. The state is published on a `watch`
//! channel so it can be read while an operation holds the workflow.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::extraction::extractor::ResumeRecord;
use crate::generation::service::{CoverLetterStyle, GenerationFailure, GenerationService};
use crate::generation::tone::{compose_instruction, Tone};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Generation(#[from] GenerationFailure),
}

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    Empty,
    Drafted,
    Refining,
    Finalized,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkflowState::Empty => "EMPTY",
            WorkflowState::Drafted => "DRAFTED",
            WorkflowState::Refining => "REFINING",
            WorkflowState::Finalized => "FINALIZED",
        })
    }
}

/// Which of the two drafts an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftVersion {
    Concise,
    Detailed,
}

impl DraftVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            DraftVersion::Concise => "concise",
            DraftVersion::Detailed => "detailed",
        }
    }
}

impl FromStr for DraftVersion {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concise" => Ok(DraftVersion::Concise),
            "detailed" => Ok(DraftVersion::Detailed),
            _ => Err(WorkflowError::InvalidState(format!(
                "unknown draft version '{s}' (expected 'concise' or 'detailed')"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefinementEvent {
    pub target: DraftVersion,
    pub instruction: String,
    pub resulting_text: String,
    pub timestamp: DateTime<Utc>,
}

/// Both drafts plus the append-only log of refinements applied to them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftBundle {
    pub concise: String,
    pub detailed: String,
    pub history: Vec<RefinementEvent>,
}

impl DraftBundle {
    fn new(concise: String, detailed: String) -> Self {
        Self {
            concise,
            detailed,
            history: Vec::new(),
        }
    }

    pub fn text(&self, version: DraftVersion) -> &str {
        match version {
            DraftVersion::Concise => &self.concise,
            DraftVersion::Detailed => &self.detailed,
        }
    }

    fn slot_mut(&mut self, version: DraftVersion) -> &mut String {
        match version {
            DraftVersion::Concise => &mut self.concise,
            DraftVersion::Detailed => &mut self.detailed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalDocument {
    pub source_version: DraftVersion,
    pub text: String,
}

/// Restores the previous state when dropped.
struct StateGuard<'a> {
    state: &'a watch::Sender<WorkflowState>,
    restore: WorkflowState,
}

impl<'a> StateGuard<'a> {
    fn enter(state: &'a watch::Sender<WorkflowState>, during: WorkflowState) -> Self {
        let restore = state.send_replace(during);
        Self { state, restore }
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        self.state.send_replace(self.restore);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Workflow
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct CoverLetterWorkflow {
    state: watch::Sender<WorkflowState>,
    drafts: Option<DraftBundle>,
    final_document: Option<FinalDocument>,
}

impl Default for CoverLetterWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverLetterWorkflow {
    pub fn new() -> Self {
        Self {
            state: watch::channel(WorkflowState::Empty).0,
            drafts: None,
            final_document: None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        *self.state.borrow()
    }

    /// Receiver that follows state changes, including the transient `REFINING`.
    pub fn watch_state(&self) -> watch::Receiver<WorkflowState> {
        self.state.subscribe()
    }

    pub fn drafts(&self) -> Option<&DraftBundle> {
        self.drafts.as_ref()
    }

    pub fn final_document(&self) -> Option<&FinalDocument> {
        self.final_document.as_ref()
    }

    /// Requests the concise and detailed drafts concurrently. Both are stored
    /// or, if either request fails, neither is and the workflow stays `EMPTY`.
    pub async fn generate(
        &mut self,
        service: &dyn GenerationService,
        resume: &ResumeRecord,
        job_description: &str,
    ) -> Result<&DraftBundle, WorkflowError> {
        if self.state() != WorkflowState::Empty {
            return Err(WorkflowError::InvalidState(format!(
                "drafts already generated (state {}); start a new session instead",
                self.state()
            )));
        }

        let (concise, detailed) = tokio::try_join!(
            service.generate_cover_letter(resume, job_description, CoverLetterStyle::Concise),
            service.generate_cover_letter(resume, job_description, CoverLetterStyle::Detailed),
        )?;

        info!(
            "Drafts generated: concise_len={}, detailed_len={}",
            concise.len(),
            detailed.len()
        );
        self.state.send_replace(WorkflowState::Drafted);
        Ok(self.drafts.insert(DraftBundle::new(concise, detailed)))
    }

    /// Rewrites one draft. Returns `Ok(None)` without calling the backend when
    /// the composed instruction is empty. On failure the draft is untouched.
    pub async fn refine(
        &mut self,
        service: &dyn GenerationService,
        target: DraftVersion,
        instruction: &str,
        tone: Option<Tone>,
    ) -> Result<Option<&RefinementEvent>, WorkflowError> {
        if !matches!(
            self.state(),
            WorkflowState::Drafted | WorkflowState::Finalized
        ) {
            return Err(WorkflowError::InvalidState(format!(
                "cannot refine in state {}",
                self.state()
            )));
        }
        let Some(drafts) = self.drafts.as_mut() else {
            return Err(WorkflowError::InvalidState("no drafts to refine".into()));
        };

        let Some(instruction) = compose_instruction(tone, instruction) else {
            debug!("Empty instruction for {}; skipping", target.as_str());
            return Ok(None);
        };

        let refined = {
            let _refining = StateGuard::enter(&self.state, WorkflowState::Refining);
            service.refine(drafts.text(target), &instruction).await?
        };

        *drafts.slot_mut(target) = refined.clone();
        drafts.history.push(RefinementEvent {
            target,
            instruction,
            resulting_text: refined,
            timestamp: Utc::now(),
        });
        info!(
            "Refined {} draft (history_len={})",
            target.as_str(),
            drafts.history.len()
        );
        Ok(drafts.history.last())
    }

    /// Copies the chosen draft's current text into the final document. May be
    /// repeated; each call overwrites the previous final document.
    pub fn finalize(&mut self, version: DraftVersion) -> Result<&FinalDocument, WorkflowError> {
        if !matches!(
            self.state(),
            WorkflowState::Drafted | WorkflowState::Finalized
        ) {
            return Err(WorkflowError::InvalidState(format!(
                "cannot finalize in state {}",
                self.state()
            )));
        }
        let Some(drafts) = self.drafts.as_ref() else {
            return Err(WorkflowError::InvalidState("no drafts to finalize".into()));
        };

        let document = FinalDocument {
            source_version: version,
            text: drafts.text(version).to_string(),
        };
        self.state.send_replace(WorkflowState::Finalized);
        info!("Finalized {} draft", version.as_str());
        Ok(self.final_document.insert(document))
    }
}
