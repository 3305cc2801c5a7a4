//! Entity Extractor: finds vocabulary skills and education/experience sentences in
//! résumé and job-description text.
//!
//! Skill detection is exact phrase matching on the token stream: a vocabulary phrase matches
//! only where its tokens appear contiguously, case-insensitively. Sentences are classified by
//! two independent predicates, so one sentence can land in both lists, one, or neither.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extraction::normalizer::{strip_markup, tokenize};
use crate::extraction::vocabulary::SkillVocabulary;

static EDUCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(bachelor|master|b\.sc|m\.sc|phd|ph\.d|degree|university|college)\b")
        .unwrap()
});

static EXPERIENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b\d+\+? years? of experience\b").unwrap());

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Structured view of a résumé produced by one extraction pass.
///
/// `skills` holds canonical vocabulary spellings only. `education` and `experience` hold
/// source sentences in document order, untouched apart from markup removal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub skills: BTreeSet<String>,
    pub education: Vec<String>,
    pub experience: Vec<String>,
}

/// Canonical skill names required by a job description.
pub type JobSkillSet = BTreeSet<String>;

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Extracts skills, education sentences and experience sentences from résumé text.
/// Empty input gives an empty record.
pub fn extract_resume(text: &str, vocab: &SkillVocabulary) -> ResumeRecord {
    let stripped = strip_markup(text);
    if stripped.trim().is_empty() {
        return ResumeRecord::default();
    }

    let mut record = ResumeRecord {
        skills: find_skills(&stripped, vocab),
        ..ResumeRecord::default()
    };

    for sentence in split_sentences(&stripped) {
        if is_education_sentence(sentence) {
            record.education.push(sentence.to_string());
        }
        if is_experience_sentence(sentence) {
            record.experience.push(sentence.to_string());
        }
    }

    debug!(
        "Extracted resume record: {} skills, {} education, {} experience sentences",
        record.skills.len(),
        record.education.len(),
        record.experience.len()
    );
    record
}

/// Extracts the vocabulary skills mentioned in a job description.
pub fn extract_job_skills(text: &str, vocab: &SkillVocabulary) -> JobSkillSet {
    let skills = find_skills(&strip_markup(text), vocab);
    debug!("Extracted {} job skills", skills.len());
    skills
}

/// Every vocabulary phrase whose tokens occur contiguously in `text`, by canonical name.
pub fn find_skills(text: &str, vocab: &SkillVocabulary) -> BTreeSet<String> {
    let tokens = tokenize(text);
    let mut found = BTreeSet::new();
    for start in 0..tokens.len() {
        for phrase in vocab.starting_with(&tokens[start]) {
            if tokens[start..].starts_with(&phrase.tokens) {
                found.insert(phrase.canonical.clone());
            }
        }
    }
    found
}

/// True if `needle` occurs as a contiguous run inside `haystack`. An empty needle never
/// matches.
pub fn contains_phrase(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Mentions a degree or an institution.
pub fn is_education_sentence(sentence: &str) -> bool {
    EDUCATION_RE.is_match(sentence)
}

/// States a number of years of experience, e.g. "5+ years of experience".
pub fn is_experience_sentence(sentence: &str) -> bool {
    EXPERIENCE_RE.is_match(sentence)
}

/// Splits text into trimmed, non-empty sentences.
///
/// Line breaks always end a sentence. `.`, `!` and `?` end one only when followed by
/// whitespace and then an uppercase letter, a digit, or the end of the text, which keeps
/// abbreviations such as "B.Sc in" or "e.g. rust" in one piece.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for (i, c) in text.char_indices() {
        let end = match c {
            '\n' | '\r' => i,
            '.' | '!' | '?' if closes_sentence(&text[i + 1..]) => i + 1,
            _ => continue,
        };
        push_trimmed(&mut sentences, &text[start..end]);
        start = i + c.len_utf8();
    }
    push_trimmed(&mut sentences, &text[start..]);

    sentences
}

fn closes_sentence(rest: &str) -> bool {
    let trimmed = rest.trim_start();
    if !rest.is_empty() && trimmed.len() == rest.len() {
        return false;
    }
    trimmed
        .chars()
        .next()
        .map_or(true, |c| c.is_uppercase() || c.is_ascii_digit())
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, candidate: &'a str) {
    let candidate = candidate.trim();
    if !candidate.is_empty() {
        sentences.push(candidate);
    }
}
