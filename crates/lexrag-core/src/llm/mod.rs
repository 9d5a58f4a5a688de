//! LLM integration
//!
//! Provides traits and implementations for:
//! - Query embedding via an external service
//! - Text generation via Ollama, Gemini and OpenAI-compatible services

mod cache;
mod client;
mod gemini;
mod http_embedder;
mod ollama;
mod traits;

pub use client::{ChatMessage, OpenAiClient};
pub use gemini::GeminiBackend;
pub use http_embedder::HttpEmbedder;
pub use ollama::OllamaBackend;
pub use traits::*;
