// Cover letter generation: backend adapter, tone directives, the
// generate → refine → finalize workflow and its in-memory sessions.
// All LLM calls go through llm_client via GenerationService.

pub mod handlers;
pub mod prompts;
pub mod service;
pub mod sessions;
pub mod tone;
pub mod workflow;
