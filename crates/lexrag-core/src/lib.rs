//! LexRAG Core Library
//!
//! Retrieval-augmented answering over legal corpora.
//!
//! # Features
//! - Vector retrieval with min-max normalized L2 scores (SQLite or Milvus)
//! - Persona-driven prompt assembly
//! - Bounded, failure-isolated fan-out to several generation backends
//! - Evidence reconciliation between answers and retrieved documents
//! - Append-only JSON audit log

pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod evidence;
pub mod fanout;
pub mod llm;
pub mod prompt;
pub mod search;
pub mod service;

pub use audit::{AuditLogger, AuditRecord, AuditSampling};
pub use config::{Config, FanoutConfig, RetrievalFailurePolicy};
pub use db::{CollectionInfo, Database, DatabaseStats};
pub use error::{Error, LexRagError, Result};
pub use evidence::{fingerprint, reconcile, EvidencePartition};
pub use fanout::{FanoutDispatcher, FanoutResponse, GenerationResult};
pub use llm::{
    ChatMessage, DecodingOptions, Embedder, GeminiBackend, GenerationBackend, HttpEmbedder,
    OllamaBackend, OpenAiClient,
};
pub use prompt::{build_prompt, Persona, PersonaSet};
pub use search::{
    normalize_scores, MilvusIndex, RetrievedDocument, Retriever, SearchHit, VectorIndex,
};
pub use service::{DraftAnswer, FanoutAnswer, Operation, QueryService, ServiceSettings};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "lexrag";

/// Default data directory name
pub const DATA_DIR_NAME: &str = "lexrag";
