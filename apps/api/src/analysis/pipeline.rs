//! Runs extractor → matcher → scorer over one résumé/job pair.

use serde::Serialize;
use tracing::debug;

use crate::extraction::extractor::{extract_job_skills, extract_resume, JobSkillSet, ResumeRecord};
use crate::extraction::vocabulary::SkillVocabulary;
use crate::matching::matcher::{match_skills, SkillMatchResult};
use crate::matching::scoring::{build_recommendation, SkillScore, SkillScorer};

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub resume: ResumeRecord,
    pub job_skills: JobSkillSet,
    #[serde(rename = "match")]
    pub skill_match: SkillMatchResult,
    pub score: SkillScore,
    pub recommendation: String,
    pub scorer: &'static str,
}

pub fn analyze(
    resume_text: &str,
    job_description: &str,
    vocabulary: &SkillVocabulary,
    scorer: &dyn SkillScorer,
) -> Analysis {
    let resume = extract_resume(resume_text, vocabulary);
    let job_skills = extract_job_skills(job_description, vocabulary);
    let skill_match = match_skills(&resume.skills, &job_skills);
    let score = scorer.score(resume_text, &job_skills);
    let recommendation = build_recommendation(score.overall, &skill_match.gaps);

    debug!(
        "Analysis: resume_skills={}, job_skills={}, matched={}, overall={:.2}",
        resume.skills.len(),
        job_skills.len(),
        skill_match.matched.len(),
        score.overall
    );

    Analysis {
        resume,
        job_skills,
        skill_match,
        score,
        recommendation,
        scorer: scorer.backend(),
    }
}
