//! Configuration management

use crate::error::{LexRagError, Result};
use crate::llm::DecodingOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Query embedding service
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Vector index holding the legal chunks
    #[serde(default)]
    pub vector_index: VectorIndexConfig,

    /// Physical collection names for each logical collection
    #[serde(default)]
    pub collections: CollectionNames,

    /// Fan-out backend set
    #[serde(default)]
    pub fanout: FanoutConfig,

    /// Single backend used for document drafting
    #[serde(default)]
    pub drafting: DraftingConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    /// Replacement persona instructions
    #[serde(default)]
    pub personas: PersonaOverrides,
}

/// Embedding service configuration (OpenAI-compatible `/v1/embeddings`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding service
    pub url: String,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector dimensionality, must match the index
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,

    /// API key (optional, for authenticated services); read but never written
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("LEXRAG_EMBEDDING_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            model: default_embedding_model(),
            dimensions: default_embedding_dimensions(),
            api_key: std::env::var("LEXRAG_EMBEDDING_API_KEY").ok(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

fn default_embedding_model() -> String {
    std::env::var("LEXRAG_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "sentence-transformers/all-MiniLM-L6-v2".to_string())
}

fn default_embedding_dimensions() -> usize {
    std::env::var("LEXRAG_EMBEDDING_DIMS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(384)
}

fn default_embedding_timeout() -> u64 {
    30
}

/// Vector index backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VectorIndexConfig {
    /// Embedded SQLite index
    Sqlite {
        #[serde(default = "default_index_path")]
        path: PathBuf,
    },
    /// Milvus over its REST v2 API
    Milvus {
        url: String,
        #[serde(default)]
        token: Option<String>,
        #[serde(default = "default_anns_field")]
        anns_field: String,
        #[serde(default = "default_nprobe")]
        nprobe: u32,
    },
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: default_index_path(),
        }
    }
}

fn default_index_path() -> PathBuf {
    std::env::var("LEXRAG_INDEX_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(crate::DATA_DIR_NAME)
                .join("index.sqlite")
        })
}

fn default_anns_field() -> String {
    "vector".to_string()
}

fn default_nprobe() -> u32 {
    10
}

/// Physical names of the three logical collections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionNames {
    #[serde(default = "default_ipc_collection")]
    pub ipc: String,
    #[serde(default = "default_precedent_collection")]
    pub precedent: String,
    #[serde(default = "default_drafting_collection")]
    pub document_creation: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            ipc: default_ipc_collection(),
            precedent: default_precedent_collection(),
            document_creation: default_drafting_collection(),
        }
    }
}

fn default_ipc_collection() -> String {
    "IPC_collection".to_string()
}

fn default_precedent_collection() -> String {
    "Precedence_collection".to_string()
}

fn default_drafting_collection() -> String {
    "Document_Creation_collection".to_string()
}

/// One entry of the fan-out backend set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendEntry {
    /// Display name used as the key in responses
    pub name: String,
    /// Model identifier sent to the backend
    pub model: String,
}

impl BackendEntry {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Fan-out configuration (local Ollama models)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanoutConfig {
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    #[serde(default = "default_backends")]
    pub backends: Vec<BackendEntry>,

    /// Per-call timeout in seconds
    #[serde(default = "default_fanout_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub decoding: DecodingOptions,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            ollama_url: default_ollama_url(),
            backends: default_backends(),
            timeout_secs: default_fanout_timeout(),
            decoding: DecodingOptions::default(),
        }
    }
}

fn default_ollama_url() -> String {
    std::env::var("LEXRAG_OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

fn default_backends() -> Vec<BackendEntry> {
    vec![
        BackendEntry::new("Llama-3.2-1B", "llama3.2:1b"),
        BackendEntry::new("Phi-2.7B", "phi:2.7b"),
        BackendEntry::new("Gemma-3-1B", "gemma3:1b"),
        BackendEntry::new("Qwen3-1.7B", "qwen3:1.7b"),
    ]
}

fn default_fanout_timeout() -> u64 {
    500
}

/// Drafting backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftingConfig {
    #[serde(default)]
    pub provider: DraftingProvider,

    /// Decoding options; the provider's defaults apply when absent
    #[serde(default)]
    pub decoding: Option<DecodingOptions>,

    #[serde(default = "default_drafting_timeout")]
    pub timeout_secs: u64,
}

impl Default for DraftingConfig {
    fn default() -> Self {
        Self {
            provider: DraftingProvider::default(),
            decoding: None,
            timeout_secs: default_drafting_timeout(),
        }
    }
}

fn default_drafting_timeout() -> u64 {
    120
}

/// Which remote model drafts documents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DraftingProvider {
    Gemini {
        #[serde(default = "default_gemini_url")]
        url: String,
        #[serde(default = "default_gemini_model")]
        model: String,
        #[serde(default = "default_drafting_api_key", skip_serializing)]
        api_key: Option<String>,
    },
    /// OpenAI-compatible chat completions
    Openai {
        url: String,
        model: String,
        #[serde(default = "default_drafting_api_key", skip_serializing)]
        api_key: Option<String>,
    },
    /// A model on the fan-out Ollama server
    Ollama { model: String },
}

impl Default for DraftingProvider {
    fn default() -> Self {
        Self::Gemini {
            url: default_gemini_url(),
            model: default_gemini_model(),
            api_key: default_drafting_api_key(),
        }
    }
}

impl DraftingProvider {
    /// Model identifier of the configured drafting backend
    pub fn model(&self) -> &str {
        match self {
            Self::Gemini { model, .. } | Self::Openai { model, .. } | Self::Ollama { model } => {
                model
            }
        }
    }
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_drafting_api_key() -> Option<String> {
    std::env::var("LEXRAG_DRAFTING_API_KEY")
        .or_else(|_| std::env::var("GEMINI_API_KEY"))
        .ok()
}

/// What to do when the embedder or the vector index fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalFailurePolicy {
    /// Fail the request
    #[default]
    Fail,
    /// Continue with no context
    EmptyContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub on_error: RetrievalFailurePolicy,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            on_error: RetrievalFailurePolicy::default(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

/// Audit log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_audit_path")]
    pub path: PathBuf,

    /// Retrieved documents kept per record
    #[serde(default = "default_retrieved_sample")]
    pub retrieved_sample: usize,

    /// Used documents kept per record
    #[serde(default)]
    pub used_sample: usize,

    /// Unused documents kept per record
    #[serde(default)]
    pub unused_sample: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_audit_path(),
            retrieved_sample: default_retrieved_sample(),
            used_sample: 0,
            unused_sample: 0,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_audit_path() -> PathBuf {
    std::env::var("LEXRAG_AUDIT_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("llm_audit_log.json"))
}

fn default_retrieved_sample() -> usize {
    1
}

/// Optional replacements for the built-in persona instructions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaOverrides {
    #[serde(default)]
    pub penal_code: Option<String>,
    #[serde(default)]
    pub precedent: Option<String>,
    #[serde(default)]
    pub drafting: Option<String>,
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from a path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Save config to a path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Check the configuration before any component is built
    pub fn validate(&self) -> Result<()> {
        if self.fanout.backends.is_empty() {
            return Err(LexRagError::Config(
                "fanout.backends must name at least one backend".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.fanout.backends {
            if entry.name.trim().is_empty() {
                return Err(LexRagError::Config(
                    "fanout backend display name is empty".to_string(),
                ));
            }
            if entry.model.trim().is_empty() {
                return Err(LexRagError::Config(format!(
                    "fanout backend '{}' has no model identifier",
                    entry.name
                )));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(LexRagError::Config(format!(
                    "duplicate fanout backend name '{}'",
                    entry.name
                )));
            }
        }

        if self.fanout.timeout_secs == 0 || self.drafting.timeout_secs == 0 {
            return Err(LexRagError::Config(
                "timeout_secs must be at least 1".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(LexRagError::Config(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(LexRagError::Config(
                "embedding.dimensions must be at least 1".to_string(),
            ));
        }

        if self.drafting.provider.model().trim().is_empty() {
            return Err(LexRagError::Config(
                "drafting provider has no model".to_string(),
            ));
        }

        self.fanout.decoding.validate()?;
        if let Some(ref decoding) = self.drafting.decoding {
            decoding.validate()?;
        }

        Ok(())
    }
}
