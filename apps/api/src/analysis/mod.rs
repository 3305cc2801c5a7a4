// Résumé/job analysis: extraction, matching and scoring in one pass.
// Pure computation; no generation backend calls here.

pub mod handlers;
pub mod pipeline;
