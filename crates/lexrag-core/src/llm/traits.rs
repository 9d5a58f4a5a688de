//! Collaborator trait definitions

use crate::error::{LexRagError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Embedding generation trait
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text; identical input yields an identical vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// A text-completion service reachable over one request/response call
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a completion for `prompt`; `None` leaves decoding to the service defaults
    async fn generate(&self, prompt: &str, options: Option<&DecodingOptions>) -> Result<String>;

    /// Model identifier this backend sends
    fn identifier(&self) -> &str;
}

/// Decoding parameters passed uniformly to every fan-out backend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodingOptions {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Nucleus sampling threshold
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Maximum generated tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for DecodingOptions {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl DecodingOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(LexRagError::Config(format!(
                "temperature {} outside 0.0..=2.0",
                self.temperature
            )));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(LexRagError::Config(format!(
                "top_p {} outside (0.0, 1.0]",
                self.top_p
            )));
        }
        if self.max_tokens == 0 {
            return Err(LexRagError::Config(
                "max_tokens must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_temperature() -> f32 {
    0.3
}

fn default_top_p() -> f32 {
    0.85
}

fn default_max_tokens() -> u32 {
    1024
}
