// Shared prompt fragments. Each service that needs LLM calls defines its own prompts.rs
// alongside it; this file holds the cross-cutting pieces.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to every free-text generation prompt.
pub const NO_PREAMBLE_INSTRUCTION: &str = "\
    Do not provide a preamble, a sign-off note about the task, or any commentary. \
    Return only the requested text.";

/// Keeps generated documents anchored to the résumé facts supplied in the prompt.
pub const GROUNDING_INSTRUCTION: &str = "\
    Only use facts present in the resume information provided. \
    Do NOT invent employers, degrees, dates, or skills. \
    If the resume does not support a claim, leave it out.";
