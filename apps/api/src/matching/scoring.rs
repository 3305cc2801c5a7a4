//! Skill Scoring: pluggable, trait-based relevance score of a résumé against a job's skills.
//!
//! Default: `VerbatimPhraseScorer` (deterministic, no I/O). Each job skill scores 1.0 when its
//! phrase occurs verbatim in the résumé text and 0.0 otherwise; `overall` is the arithmetic
//! mean. Weighted or fuzzy scorers can replace it behind the same trait.
//!
//! `AppState` holds an `Arc<dyn SkillScorer>`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::extraction::extractor::contains_phrase;
use crate::extraction::normalizer::{strip_markup, tokenize};

// ────────────────────────────────────────────────────────────────────────────
// Output data model
// ────────────────────────────────────────────────────────────────────────────

/// Per-skill relevance in [0, 1] and their mean. `breakdown` keys are the job skills.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillScore {
    pub overall: f64,
    pub breakdown: BTreeMap<String, f64>,
}

impl SkillScore {
    /// Builds a score from per-skill values; `overall` is their mean, 0.0 when empty.
    pub fn from_breakdown(breakdown: BTreeMap<String, f64>) -> Self {
        let overall = if breakdown.is_empty() {
            0.0
        } else {
            breakdown.values().sum::<f64>() / breakdown.len() as f64
        };
        Self { overall, breakdown }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap scoring rules without touching callers.
pub trait SkillScorer: Send + Sync {
    fn score(&self, resume_text: &str, job_skills: &BTreeSet<String>) -> SkillScore;

    /// Short label reported alongside scores, e.g. "verbatim".
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// VerbatimPhraseScorer (default implementation)
// ────────────────────────────────────────────────────────────────────────────

/// 1.0 if the skill's tokens appear contiguously in the markup-stripped résumé text,
/// case-insensitively; 0.0 otherwise.
pub struct VerbatimPhraseScorer;

impl SkillScorer for VerbatimPhraseScorer {
    fn score(&self, resume_text: &str, job_skills: &BTreeSet<String>) -> SkillScore {
        let resume_tokens = tokenize(&strip_markup(resume_text));

        let breakdown = job_skills
            .iter()
            .map(|skill| {
                let present = contains_phrase(&resume_tokens, &tokenize(skill));
                (skill.clone(), if present { 1.0 } else { 0.0 })
            })
            .collect();

        SkillScore::from_breakdown(breakdown)
    }

    fn backend(&self) -> &'static str {
        "verbatim"
    }
}

/// Human-readable summary of a score and its gaps.
pub fn build_recommendation(overall: f64, gaps: &BTreeSet<String>) -> String {
    let percent = (overall * 100.0).round() as u32;
    let top_gaps: Vec<&str> = gaps.iter().take(3).map(String::as_str).collect();

    if gaps.is_empty() && percent == 0 {
        "No vocabulary skills found in the job description.".to_string()
    } else if gaps.is_empty() {
        "Strong fit. The résumé covers every skill the job asks for.".to_string()
    } else if percent >= 60 {
        format!(
            "Moderate fit ({percent}/100). Consider highlighting: {}.",
            top_gaps.join(", ")
        )
    } else {
        format!(
            "Low fit ({percent}/100). Significant gaps: {}.",
            top_gaps.join(", ")
        )
    }
}
