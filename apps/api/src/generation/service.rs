//! Text generation boundary.
//!
//! Everything that needs prose from a language model goes through the
//! [`GenerationService`] trait. The production implementation,
//! [`LlmGenerationService`], renders the prompt templates and sends them through
//! [`LlmClient`]; tests substitute a scripted fake.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::extraction::extractor::ResumeRecord;
use crate::extraction::normalizer::normalize;
use crate::generation::prompts::{
    render, resume_summary, COVER_LETTER_PROMPT_TEMPLATE, INTERVIEW_QA_PROMPT_TEMPLATE,
    INTERVIEW_SYSTEM, JOB_EXTRACTION_PROMPT_TEMPLATE, REFINE_PROMPT_TEMPLATE, WRITER_SYSTEM,
};
use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM, NO_PREAMBLE_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverLetterStyle {
    Standard,
    Concise,
    Detailed,
}

impl CoverLetterStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            CoverLetterStyle::Standard => "standard",
            CoverLetterStyle::Concise => "concise",
            CoverLetterStyle::Detailed => "detailed",
        }
    }
}

/// The four kinds of request sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    CoverLetter,
    Refinement,
    InterviewQa,
    JobExtraction,
}

impl PromptRole {
    pub fn as_str(self) -> &'static str {
        match self {
            PromptRole::CoverLetter => "cover_letter",
            PromptRole::Refinement => "refinement",
            PromptRole::InterviewQa => "interview_qa",
            PromptRole::JobExtraction => "job_extraction",
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            PromptRole::CoverLetter | PromptRole::Refinement => WRITER_SYSTEM,
            PromptRole::InterviewQa => INTERVIEW_SYSTEM,
            PromptRole::JobExtraction => JSON_ONLY_SYSTEM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    UpstreamError,
    MalformedResponse,
    Timeout,
}

/// A generation request that did not produce usable text.
#[derive(Debug, Clone, Error)]
pub enum GenerationFailure {
    #[error("generation backend error: {message}")]
    UpstreamError {
        status: Option<u16>,
        message: String,
    },

    #[error("malformed generation response: {0}")]
    MalformedResponse(String),

    #[error("generation timed out after {}s", .after.as_secs())]
    Timeout { after: Duration },
}

impl GenerationFailure {
    pub fn reason(&self) -> FailureReason {
        match self {
            GenerationFailure::UpstreamError { .. } => FailureReason::UpstreamError,
            GenerationFailure::MalformedResponse(_) => FailureReason::MalformedResponse,
            GenerationFailure::Timeout { .. } => FailureReason::Timeout,
        }
    }
}

impl From<LlmError> for GenerationFailure {
    fn from(error: LlmError) -> Self {
        match error {
            LlmError::Http(e) => GenerationFailure::UpstreamError {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            LlmError::Api { status, message } => GenerationFailure::UpstreamError {
                status: Some(status),
                message,
            },
            LlmError::Parse(e) => GenerationFailure::MalformedResponse(e.to_string()),
            LlmError::EmptyContent => {
                GenerationFailure::MalformedResponse("response contained no text".to_string())
            }
            LlmError::Timeout { after } => GenerationFailure::Timeout { after },
        }
    }
}

/// One job posting pulled out of a careers page.
///
/// Model output is loosely typed: `null` reads as empty, numbers as their text, and
/// `skills` may arrive as a comma-separated string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(deserialize_with = "lenient_text")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub experience: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .into_iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let items = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect(),
        other => vec![other.to_string()],
    };
    Ok(items)
}

/// The model sometimes returns a bare object instead of a one-element array.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<JobPosting>),
    One(JobPosting),
}

impl From<OneOrMany> for Vec<JobPosting> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::Many(postings) => postings,
            OneOrMany::One(posting) => vec![posting],
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Writes a cover letter for the résumé and job description in the given style.
    async fn generate_cover_letter(
        &self,
        resume: &ResumeRecord,
        job_description: &str,
        style: CoverLetterStyle,
    ) -> Result<String, GenerationFailure>;

    /// Rewrites `document` according to `instruction`.
    async fn refine(&self, document: &str, instruction: &str) -> Result<String, GenerationFailure>;

    /// Produces `count` interview questions with answers, as a Markdown list.
    async fn generate_interview_qa(
        &self,
        resume: &ResumeRecord,
        job_description: &str,
        count: u32,
    ) -> Result<String, GenerationFailure>;

    async fn extract_job_postings(
        &self,
        page_text: &str,
    ) -> Result<Vec<JobPosting>, GenerationFailure>;
}

// ────────────────────────────────────────────────────────────────────────────
// LLM-backed implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct LlmGenerationService {
    llm: LlmClient,
}

impl LlmGenerationService {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    async fn complete(&self, role: PromptRole, prompt: &str) -> Result<String, GenerationFailure> {
        debug!("generation request: role={}", role.as_str());
        self.llm
            .call_text(prompt, role.system_prompt())
            .await
            .map_err(|e| {
                warn!("generation failed: role={}, error={e}", role.as_str());
                GenerationFailure::from(e)
            })
    }
}

#[async_trait]
impl GenerationService for LlmGenerationService {
    async fn generate_cover_letter(
        &self,
        resume: &ResumeRecord,
        job_description: &str,
        style: CoverLetterStyle,
    ) -> Result<String, GenerationFailure> {
        let summary = resume_summary(resume);
        let prompt = render(
            COVER_LETTER_PROMPT_TEMPLATE,
            &[
                ("resume_summary", summary.as_str()),
                ("job_description", job_description),
                ("style", style.as_str()),
                ("grounding_instruction", GROUNDING_INSTRUCTION),
                ("no_preamble_instruction", NO_PREAMBLE_INSTRUCTION),
            ],
        );
        self.complete(PromptRole::CoverLetter, &prompt).await
    }

    async fn refine(&self, document: &str, instruction: &str) -> Result<String, GenerationFailure> {
        let prompt = render(
            REFINE_PROMPT_TEMPLATE,
            &[
                ("cover_letter", document),
                ("instructions", instruction),
                ("no_preamble_instruction", NO_PREAMBLE_INSTRUCTION),
            ],
        );
        self.complete(PromptRole::Refinement, &prompt).await
    }

    async fn generate_interview_qa(
        &self,
        resume: &ResumeRecord,
        job_description: &str,
        count: u32,
    ) -> Result<String, GenerationFailure> {
        let summary = resume_summary(resume);
        let count = count.to_string();
        let prompt = render(
            INTERVIEW_QA_PROMPT_TEMPLATE,
            &[
                ("resume_summary", summary.as_str()),
                ("job_description", job_description),
                ("num_questions", count.as_str()),
            ],
        );
        self.complete(PromptRole::InterviewQa, &prompt).await
    }

    async fn extract_job_postings(
        &self,
        page_text: &str,
    ) -> Result<Vec<JobPosting>, GenerationFailure> {
        let page_data = normalize(page_text);
        let values = [("page_data", page_data.as_str())];
        let prompt = render(JOB_EXTRACTION_PROMPT_TEMPLATE, &values);
        let role = PromptRole::JobExtraction;
        debug!("generation request: role={}", role.as_str());
        let postings: OneOrMany = self
            .llm
            .call_json(&prompt, role.system_prompt())
            .await
            .map_err(|e| {
                warn!("job extraction failed: {e}");
                GenerationFailure::from(e)
            })?;
        Ok(postings.into())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scripted fake for tests
// ────────────────────────────────────────────────────────────────────────────
