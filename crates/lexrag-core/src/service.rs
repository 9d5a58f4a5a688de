//! Query orchestration
//!
//! Every operation runs the same pipeline: validate, retrieve, build the
//! prompt, generate, reconcile evidence against one answer, then audit.
//! Retrieval always completes before any generation call is issued, and the
//! audit write happens last and never fails the request.

use crate::audit::AuditLogger;
use crate::config::{
    CollectionNames, Config, DraftingProvider, RetrievalFailurePolicy, VectorIndexConfig,
};
use crate::db::Database;
use crate::error::{LexRagError, Result};
use crate::evidence::{reconcile, EvidencePartition};
use crate::fanout::{FanoutDispatcher, GenerationResult};
use crate::llm::{
    DecodingOptions, Embedder, GeminiBackend, GenerationBackend, HttpEmbedder, OllamaBackend,
    OpenAiClient,
};
use crate::prompt::{build_prompt, Persona, PersonaSet};
use crate::search::{MilvusIndex, RetrievedDocument, Retriever, VectorIndex};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Logical collection an operation searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Ipc,
    Precedent,
    DocumentCreation,
}

impl CollectionKind {
    pub fn physical_name(self, names: &CollectionNames) -> &str {
        match self {
            Self::Ipc => &names.ipc,
            Self::Precedent => &names.precedent,
            Self::DocumentCreation => &names.document_creation,
        }
    }
}

/// The three operations exposed to front doors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    PenalCode,
    Precedent,
    Draft,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PenalCode => "ipc",
            Self::Precedent => "precedent",
            Self::Draft => "draft",
        }
    }

    pub fn collection(self) -> CollectionKind {
        match self {
            Self::PenalCode => CollectionKind::Ipc,
            Self::Precedent => CollectionKind::Precedent,
            Self::Draft => CollectionKind::DocumentCreation,
        }
    }

    pub fn persona(self) -> Persona {
        match self {
            Self::PenalCode => Persona::PenalCode,
            Self::Precedent => Persona::Precedent,
            Self::Draft => Persona::Drafting,
        }
    }
}

/// Result of a fan-out operation
#[derive(Debug, Clone, Serialize)]
pub struct FanoutAnswer {
    /// Backend display name to answer text; failed backends carry a diagnostic
    pub answers: HashMap<String, String>,
    #[serde(skip)]
    pub results: HashMap<String, GenerationResult>,
    /// Backend whose answer was reconciled and audited
    pub primary_backend: Option<String>,
    pub retrieved_docs: Vec<RetrievedDocument>,
    pub used_docs: Vec<RetrievedDocument>,
    pub unused_docs: Vec<RetrievedDocument>,
}

/// Result of the drafting operation
#[derive(Debug, Clone, Serialize)]
pub struct DraftAnswer {
    pub contract: String,
    pub retrieved_docs: Vec<RetrievedDocument>,
    pub used_docs: Vec<RetrievedDocument>,
    pub unused_docs: Vec<RetrievedDocument>,
}

/// Tunables that are not components
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub collections: CollectionNames,
    pub top_k: usize,
    pub on_retrieval_error: RetrievalFailurePolicy,
    pub personas: PersonaSet,
    /// Decoding for the drafting backend; `None` uses the provider's defaults
    pub drafting_options: Option<DecodingOptions>,
    pub drafting_timeout: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            collections: CollectionNames::default(),
            top_k: 3,
            on_retrieval_error: RetrievalFailurePolicy::Fail,
            personas: PersonaSet::default(),
            drafting_options: None,
            drafting_timeout: Duration::from_secs(120),
        }
    }
}

impl ServiceSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            collections: config.collections.clone(),
            top_k: config.retrieval.top_k,
            on_retrieval_error: config.retrieval.on_error,
            personas: PersonaSet::from_overrides(&config.personas),
            drafting_options: config.drafting.decoding,
            drafting_timeout: Duration::from_secs(config.drafting.timeout_secs),
        }
    }
}

/// Orchestrates retrieval, generation, evidence and audit per request
pub struct QueryService {
    retriever: Retriever,
    dispatcher: FanoutDispatcher,
    drafter: Arc<dyn GenerationBackend>,
    audit: Option<AuditLogger>,
    settings: ServiceSettings,
}

impl QueryService {
    pub fn new(
        retriever: Retriever,
        dispatcher: FanoutDispatcher,
        drafter: Arc<dyn GenerationBackend>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            retriever,
            dispatcher,
            drafter,
            audit: None,
            settings,
        }
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Construct every collaborator from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let embedder: Arc<dyn Embedder> = Arc::new(HttpEmbedder::from_config(&config.embedding)?);
        let index = open_vector_index(&config.vector_index)?;
        let retriever = Retriever::new(embedder, index);
        let dispatcher = FanoutDispatcher::from_config(&config.fanout)?;
        let drafter = build_drafter(config)?;

        let mut service = Self::new(
            retriever,
            dispatcher,
            drafter,
            ServiceSettings::from_config(config),
        );
        if let Some(audit) = AuditLogger::from_config(&config.audit) {
            service = service.with_audit(audit);
        }
        Ok(service)
    }

    pub fn dispatcher(&self) -> &FanoutDispatcher {
        &self.dispatcher
    }

    pub fn drafter(&self) -> &dyn GenerationBackend {
        self.drafter.as_ref()
    }

    /// Penal code query answered by every fan-out backend
    pub async fn answer_penal_code_query(&self, query: &str) -> Result<FanoutAnswer> {
        self.answer_with_fanout(Operation::PenalCode, query).await
    }

    /// Precedent query answered by every fan-out backend
    pub async fn answer_precedent_query(&self, query: &str) -> Result<FanoutAnswer> {
        self.answer_with_fanout(Operation::Precedent, query).await
    }

    /// Draft a legal document with the single drafting backend
    ///
    /// Unlike the fan-out operations, a backend failure fails the request.
    pub async fn draft_document(&self, question: &str) -> Result<DraftAnswer> {
        let operation = Operation::Draft;
        validate_query(question, "Question is required")?;
        let start = Instant::now();

        let retrieved = self.retrieve(operation, question).await?;
        let prompt = build_prompt(
            self.settings.personas.instructions(operation.persona()),
            &retrieved,
            question,
        );

        let identifier = self.drafter.identifier().to_string();
        let contract = match tokio::time::timeout(
            self.settings.drafting_timeout,
            self.drafter
                .generate(&prompt, self.settings.drafting_options.as_ref()),
        )
        .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                return Err(LexRagError::backend(
                    identifier,
                    format!("Error generating contract: {}", e),
                ))
            }
            Err(_) => {
                return Err(LexRagError::backend(
                    identifier,
                    format!(
                        "Error generating contract: timed out after {}s",
                        self.settings.drafting_timeout.as_secs()
                    ),
                ))
            }
        };

        let EvidencePartition { used, unused } = reconcile(&contract, &retrieved);
        self.audit(operation, question, &retrieved, &contract, &used, &unused)
            .await;

        tracing::info!(
            "{} request: {} docs, {} used, {}ms",
            operation.as_str(),
            retrieved.len(),
            used.len(),
            start.elapsed().as_millis()
        );

        Ok(DraftAnswer {
            contract,
            retrieved_docs: retrieved,
            used_docs: used,
            unused_docs: unused,
        })
    }

    async fn answer_with_fanout(&self, operation: Operation, query: &str) -> Result<FanoutAnswer> {
        validate_query(query, "Query text is required")?;
        let start = Instant::now();

        let retrieved = self.retrieve(operation, query).await?;
        let prompt = build_prompt(
            self.settings.personas.instructions(operation.persona()),
            &retrieved,
            query,
        );

        let response = self.dispatcher.dispatch(&prompt).await;

        let primary = response.primary().cloned();
        let primary_answer = primary
            .as_ref()
            .map(|r| r.answer_text.as_str())
            .unwrap_or_default();
        let EvidencePartition { used, unused } = reconcile(primary_answer, &retrieved);

        self.audit(operation, query, &retrieved, primary_answer, &used, &unused)
            .await;

        tracing::info!(
            "{} request: {} docs, {} backends ({} failed), {} used, {}ms",
            operation.as_str(),
            retrieved.len(),
            response.len(),
            response.failed_count(),
            used.len(),
            start.elapsed().as_millis()
        );

        Ok(FanoutAnswer {
            answers: response.answers(),
            results: response.into_results(),
            primary_backend: primary.map(|r| r.backend_name),
            retrieved_docs: retrieved,
            used_docs: used,
            unused_docs: unused,
        })
    }

    async fn retrieve(&self, operation: Operation, query: &str) -> Result<Vec<RetrievedDocument>> {
        let collection = operation
            .collection()
            .physical_name(&self.settings.collections);

        match self
            .retriever
            .retrieve(collection, query, self.settings.top_k)
            .await
        {
            Ok(docs) => Ok(docs),
            Err(e) if self.settings.on_retrieval_error == RetrievalFailurePolicy::EmptyContext => {
                tracing::warn!(
                    "Retrieval from {} failed, continuing without context: {}",
                    collection,
                    e
                );
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn audit(
        &self,
        operation: Operation,
        query: &str,
        retrieved: &[RetrievedDocument],
        answer: &str,
        used: &[RetrievedDocument],
        unused: &[RetrievedDocument],
    ) {
        let Some(ref audit) = self.audit else {
            return;
        };

        if let Err(e) = audit
            .append(operation.as_str(), query, retrieved, answer, used, unused)
            .await
        {
            tracing::warn!("Failed to write audit record: {}", e);
        }
    }
}

fn validate_query(query: &str, message: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(LexRagError::InvalidInput(message.to_string()));
    }
    Ok(())
}

/// Open the configured vector index
pub fn open_vector_index(config: &VectorIndexConfig) -> Result<Arc<dyn VectorIndex>> {
    match config {
        VectorIndexConfig::Sqlite { path } => {
            let db = Database::open(path)?;
            db.initialize()?;
            Ok(Arc::new(db))
        }
        VectorIndexConfig::Milvus {
            url,
            token,
            anns_field,
            nprobe,
        } => Ok(Arc::new(MilvusIndex::new(
            url.clone(),
            token.clone(),
            anns_field.clone(),
            *nprobe,
        )?)),
    }
}

fn build_drafter(config: &Config) -> Result<Arc<dyn GenerationBackend>> {
    let timeout = Duration::from_secs(config.drafting.timeout_secs);
    let drafter: Arc<dyn GenerationBackend> = match config.drafting.provider {
        DraftingProvider::Gemini {
            ref url,
            ref model,
            ref api_key,
        } => Arc::new(GeminiBackend::new(
            url.clone(),
            model.clone(),
            api_key.clone(),
            timeout,
        )?),
        DraftingProvider::Openai {
            ref url,
            ref model,
            ref api_key,
        } => Arc::new(OpenAiClient::new(
            url.clone(),
            model.clone(),
            api_key.clone(),
            timeout,
        )?),
        DraftingProvider::Ollama { ref model } => Arc::new(OllamaBackend::new(
            config.fanout.ollama_url.clone(),
            model.clone(),
            timeout,
        )?),
    };
    Ok(drafter)
}
