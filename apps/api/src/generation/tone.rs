//! Tone directives for refinement requests.
//!
//! A refinement may name a tone; its directive is prefixed to the user's
//! free-text instruction before the draft is sent back to the model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Formal,
    Friendly,
    Enthusiastic,
    Confident,
    Concise,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Formal,
        Tone::Friendly,
        Tone::Enthusiastic,
        Tone::Confident,
        Tone::Concise,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Formal => "formal",
            Tone::Friendly => "friendly",
            Tone::Enthusiastic => "enthusiastic",
            Tone::Confident => "confident",
            Tone::Concise => "concise",
        }
    }

    /// The sentence prefixed to a refinement instruction.
    pub fn directive(self) -> &'static str {
        match self {
            Tone::Formal => "Use a formal, professional tone.",
            Tone::Friendly => "Use a warm, friendly tone while staying professional.",
            Tone::Enthusiastic => {
                "Use an enthusiastic tone that conveys genuine interest in the role."
            }
            Tone::Confident => "Use a confident, assertive tone without overstating facts.",
            Tone::Concise => "Make the letter more concise and remove filler sentences.",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tone '{0}'")]
pub struct UnknownTone(pub String);

impl FromStr for Tone {
    type Err = UnknownTone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Tone::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownTone(s.to_string()))
    }
}

/// Builds the instruction sent to the model. Returns `None` when there is
/// nothing to ask for, i.e. no tone and a blank instruction.
pub fn compose_instruction(tone: Option<Tone>, instruction: &str) -> Option<String> {
    let instruction = instruction.trim();
    match (tone, instruction.is_empty()) {
        (None, true) => None,
        (None, false) => Some(instruction.to_string()),
        (Some(tone), true) => Some(tone.directive().to_string()),
        (Some(tone), false) => Some(format!("{} {}", tone.directive(), instruction)),
    }
}
