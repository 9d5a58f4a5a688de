//! Multi-backend fan-out
//!
//! One prompt goes to every configured backend concurrently. Each call is
//! isolated: a failure or timeout becomes a diagnostic answer for that backend
//! only. The dispatcher joins on every call before returning, so a response
//! always has exactly one entry per backend.
//!
//! Concurrency is bounded by a semaphore sized to the backend count. The
//! semaphore belongs to the dispatcher, so concurrent requests sharing one
//! dispatcher queue for the same slots.

use crate::config::FanoutConfig;
use crate::error::{LexRagError, Result};
use crate::llm::{DecodingOptions, GenerationBackend, OllamaBackend};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Separator between the backend tag and details in a diagnostic answer
pub const DIAGNOSTIC_SEPARATOR: &str = "] error – ";

/// Outcome of one backend call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub backend_name: String,
    /// Generated text, or a diagnostic string when the call failed
    pub answer_text: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl GenerationResult {
    pub fn success(backend_name: impl Into<String>, answer_text: impl Into<String>) -> Self {
        Self {
            backend_name: backend_name.into(),
            answer_text: answer_text.into(),
            succeeded: true,
            error_detail: None,
        }
    }

    /// Failed call; the answer becomes `[<identifier>] error – <detail>`
    pub fn failure(
        backend_name: impl Into<String>,
        identifier: &str,
        detail: impl Into<String>,
    ) -> Self {
        let detail = detail.into();
        Self {
            backend_name: backend_name.into(),
            answer_text: diagnostic_answer(identifier, &detail),
            succeeded: false,
            error_detail: Some(detail),
        }
    }
}

/// Format the placeholder answer for a failed backend
pub fn diagnostic_answer(identifier: &str, detail: &str) -> String {
    format!("[{}{}{}", identifier, DIAGNOSTIC_SEPARATOR, detail)
}

/// Whether an answer string is a failure placeholder
pub fn is_diagnostic(answer: &str) -> bool {
    answer.starts_with('[') && answer.contains(DIAGNOSTIC_SEPARATOR)
}

/// All results of one fan-out, keyed by backend display name
#[derive(Debug, Clone, Default)]
pub struct FanoutResponse {
    results: HashMap<String, GenerationResult>,
    completion_order: Vec<String>,
}

impl FanoutResponse {
    fn record(&mut self, result: GenerationResult) {
        self.completion_order.push(result.backend_name.clone());
        self.results.insert(result.backend_name.clone(), result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, backend_name: &str) -> Option<&GenerationResult> {
        self.results.get(backend_name)
    }

    /// The first result to complete; used for evidence and audit
    pub fn primary(&self) -> Option<&GenerationResult> {
        self.completion_order
            .first()
            .and_then(|name| self.results.get(name))
    }

    /// Display names in the order their calls finished
    pub fn completion_order(&self) -> &[String] {
        &self.completion_order
    }

    pub fn results(&self) -> impl Iterator<Item = &GenerationResult> {
        self.results.values()
    }

    /// Backend name to answer text (diagnostics included)
    pub fn answers(&self) -> HashMap<String, String> {
        self.results
            .iter()
            .map(|(name, r)| (name.clone(), r.answer_text.clone()))
            .collect()
    }

    pub fn failed_count(&self) -> usize {
        self.results.values().filter(|r| !r.succeeded).count()
    }

    pub fn into_results(self) -> HashMap<String, GenerationResult> {
        self.results
    }
}

struct BackendHandle {
    name: String,
    backend: Arc<dyn GenerationBackend>,
}

/// Sends one prompt to a fixed set of backends
pub struct FanoutDispatcher {
    backends: Vec<BackendHandle>,
    permits: Arc<Semaphore>,
    options: DecodingOptions,
    timeout: Duration,
}

impl FanoutDispatcher {
    /// Build from `(display name, backend)` pairs; names must be unique
    pub fn new(
        backends: Vec<(String, Arc<dyn GenerationBackend>)>,
        options: DecodingOptions,
        timeout: Duration,
    ) -> Result<Self> {
        if backends.is_empty() {
            return Err(LexRagError::Config(
                "fan-out needs at least one backend".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (name, _) in &backends {
            if !seen.insert(name.as_str()) {
                return Err(LexRagError::Config(format!(
                    "duplicate fan-out backend '{}'",
                    name
                )));
            }
        }

        let permits = Arc::new(Semaphore::new(backends.len()));
        let backends = backends
            .into_iter()
            .map(|(name, backend)| BackendHandle { name, backend })
            .collect();

        Ok(Self {
            backends,
            permits,
            options,
            timeout,
        })
    }

    /// Ollama backends for every configured entry, sharing one HTTP client
    pub fn from_config(config: &FanoutConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http_client = OllamaBackend::http_client(timeout)?;

        let backends = config
            .backends
            .iter()
            .map(|entry| {
                let backend: Arc<dyn GenerationBackend> = Arc::new(OllamaBackend::with_client(
                    http_client.clone(),
                    config.ollama_url.clone(),
                    entry.model.clone(),
                ));
                (entry.name.clone(), backend)
            })
            .collect();

        Self::new(backends, config.decoding, timeout)
    }

    pub fn backend_names(&self) -> impl Iterator<Item = &str> {
        self.backends.iter().map(|b| b.name.as_str())
    }

    /// Size of the worker pool
    pub fn capacity(&self) -> usize {
        self.backends.len()
    }

    /// Send `prompt` to every backend and wait for all of them
    pub async fn dispatch(&self, prompt: &str) -> FanoutResponse {
        let start = Instant::now();

        let completed: Vec<GenerationResult> = self
            .backends
            .iter()
            .map(|handle| self.run_one(handle, prompt))
            .collect::<FuturesUnordered<_>>()
            .collect()
            .await;

        let mut response = FanoutResponse::default();
        for result in completed {
            response.record(result);
        }

        tracing::info!(
            "Fan-out to {} backends finished in {}ms ({} failed)",
            response.len(),
            start.elapsed().as_millis(),
            response.failed_count()
        );

        response
    }

    async fn run_one(&self, handle: &BackendHandle, prompt: &str) -> GenerationResult {
        let identifier = handle.backend.identifier();

        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                return GenerationResult::failure(&handle.name, identifier, e.to_string());
            }
        };

        let start = Instant::now();
        let outcome = tokio::time::timeout(
            self.timeout,
            handle.backend.generate(prompt, Some(&self.options)),
        )
        .await;

        let result = match outcome {
            Ok(Ok(text)) => GenerationResult::success(&handle.name, text),
            Ok(Err(e)) => GenerationResult::failure(&handle.name, identifier, e.to_string()),
            Err(_) => GenerationResult::failure(
                &handle.name,
                identifier,
                format!("timed out after {}s", self.timeout.as_secs()),
            ),
        };

        if result.succeeded {
            tracing::debug!(
                "Backend {} ({}) answered in {}ms",
                handle.name,
                identifier,
                start.elapsed().as_millis()
            );
        } else {
            tracing::warn!(
                "Backend {} ({}) failed: {}",
                handle.name,
                identifier,
                result.error_detail.as_deref().unwrap_or_default()
            );
        }

        result
    }
}
