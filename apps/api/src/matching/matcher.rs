//! Skill Matcher: splits a job's skills into those the résumé covers and the gaps.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

/// `matched` and `gaps` partition the job skill set: disjoint, and together equal to it.
/// Names keep the job side's canonical spelling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillMatchResult {
    pub matched: BTreeSet<String>,
    pub gaps: BTreeSet<String>,
}

/// Case-insensitive set intersection (`matched`) and difference (`gaps`) of job skills
/// against résumé skills.
pub fn match_skills(
    resume_skills: &BTreeSet<String>,
    job_skills: &BTreeSet<String>,
) -> SkillMatchResult {
    let held: HashSet<String> = resume_skills.iter().map(|s| s.to_lowercase()).collect();

    let (matched, gaps) = job_skills
        .iter()
        .cloned()
        .partition(|skill| held.contains(&skill.to_lowercase()));

    SkillMatchResult { matched, gaps }
}
