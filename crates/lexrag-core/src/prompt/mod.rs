//! Prompt assembly
//!
//! A prompt is the persona instructions, a blank line, then
//! `Context:\n<context>\n\nQuestion: <question>`. No truncation happens here.

mod personas;

use crate::config::PersonaOverrides;
use crate::search::RetrievedDocument;
use serde::Serialize;

/// Context used when retrieval returned nothing
pub const NO_CONTEXT_SENTINEL: &str = "No legal context available.";

/// Instruction template for one endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// Knowledge-graph citation trace over penal code sections
    PenalCode,
    /// Case-citation format for precedent queries
    Precedent,
    /// Formal document drafting
    Drafting,
}

impl Persona {
    pub fn default_instructions(self) -> &'static str {
        match self {
            Self::PenalCode => personas::PENAL_CODE,
            Self::Precedent => personas::PRECEDENT,
            Self::Drafting => personas::DRAFTING,
        }
    }
}

/// Persona instructions in effect for a running service
#[derive(Debug, Clone)]
pub struct PersonaSet {
    penal_code: String,
    precedent: String,
    drafting: String,
}

impl Default for PersonaSet {
    fn default() -> Self {
        Self::from_overrides(&PersonaOverrides::default())
    }
}

impl PersonaSet {
    pub fn from_overrides(overrides: &PersonaOverrides) -> Self {
        let pick = |custom: &Option<String>, persona: Persona| {
            custom
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(persona.default_instructions())
                .to_string()
        };

        Self {
            penal_code: pick(&overrides.penal_code, Persona::PenalCode),
            precedent: pick(&overrides.precedent, Persona::Precedent),
            drafting: pick(&overrides.drafting, Persona::Drafting),
        }
    }

    pub fn instructions(&self, persona: Persona) -> &str {
        match persona {
            Persona::PenalCode => &self.penal_code,
            Persona::Precedent => &self.precedent,
            Persona::Drafting => &self.drafting,
        }
    }
}

/// Join document texts with a blank line, or the sentinel when there are none
pub fn build_context(documents: &[RetrievedDocument]) -> String {
    if documents.is_empty() {
        return NO_CONTEXT_SENTINEL.to_string();
    }
    documents
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the generation prompt
pub fn build_prompt(instructions: &str, documents: &[RetrievedDocument], question: &str) -> String {
    format!(
        "{}\n\nContext:\n{}\n\nQuestion: {}",
        instructions,
        build_context(documents),
        question
    )
}
