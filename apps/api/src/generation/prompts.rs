// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::extraction::extractor::ResumeRecord;

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// System prompt for cover letters and their refinements.
pub const WRITER_SYSTEM: &str = "You are an experienced career coach and professional writer. \
    You write tailored, truthful cover letters in clear business English.";

/// System prompt for interview preparation.
pub const INTERVIEW_SYSTEM: &str = "You are a hiring manager preparing a candidate for an \
    interview. You write realistic questions and concise answers grounded in the candidate's \
    resume.";

/// Cover letter prompt. Replace `{resume_summary}`, `{job_description}`, `{style}`,
/// `{grounding_instruction}` and `{no_preamble_instruction}` before sending.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"### RESUME INFORMATION:
{resume_summary}

### JOB DESCRIPTION:
{job_description}

### INSTRUCTION:
Using the resume information and job description above, write a {style} professional cover letter highlighting the most relevant experience and skills that match the job requirements.
Tailor the letter to the position.
{grounding_instruction}
{no_preamble_instruction}

### COVER LETTER:
"#;

/// Refinement prompt. Replace `{cover_letter}`, `{instructions}` and
/// `{no_preamble_instruction}` before sending.
pub const REFINE_PROMPT_TEMPLATE: &str = r#"### CURRENT COVER LETTER:
{cover_letter}

### INSTRUCTION:
{instructions}

Rewrite the cover letter accordingly while preserving key information.
{no_preamble_instruction}

### REVISED COVER LETTER:
"#;

/// Interview Q&A prompt. Replace `{resume_summary}`, `{job_description}` and
/// `{num_questions}` before sending.
pub const INTERVIEW_QA_PROMPT_TEMPLATE: &str = r#"### RESUME INFORMATION:
{resume_summary}

### JOB DESCRIPTION:
{job_description}

### INSTRUCTION:
Generate {num_questions} potential interview questions for this role. For each question, craft a concise answer using details from the resume information above.
Format the result as a numbered list in Markdown:

1. **Question:** ...
   **Answer:** ...

Do not include any preamble or text outside the list.

### INTERVIEW Q&A:
"#;

/// Job posting extraction prompt. Replace `{page_data}` before sending.
pub const JOB_EXTRACTION_PROMPT_TEMPLATE: &str = r#"### SCRAPED TEXT FROM WEBSITE:
{page_data}

### INSTRUCTION:
The scraped text is from the careers page of a website.
Extract the job postings and return them as a JSON array of objects with the keys `role`, `experience`, `skills` and `description`.
`role`, `experience` and `description` are strings; `skills` is an array of strings.
Only return valid JSON.

### VALID JSON (NO PREAMBLE):
"#;

/// Fills `{name}` placeholders in a single pass over `template`. Substituted values are
/// never rescanned, so user text containing `{style}` and the like is sent verbatim.
/// Unknown placeholders are left as they are.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
        })
        .into_owned()
}

/// Renders the résumé record the way every generation prompt presents it.
pub fn resume_summary(resume: &ResumeRecord) -> String {
    format!(
        "Skills: {}\nEducation: {}\nExperience: {}",
        resume
            .skills
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        resume.education.join("; "),
        resume.experience.join("; ")
    )
}
