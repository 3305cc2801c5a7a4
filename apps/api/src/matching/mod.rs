// Skill matching and relevance scoring over extracted skill sets.

pub mod matcher;
pub mod scoring;
