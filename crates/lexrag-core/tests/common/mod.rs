//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use lexrag_core::{DecodingOptions, Embedder, GenerationBackend, LexRagError, Result};
use lexrag_core::{SearchHit, VectorIndex};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Embedder that looks texts up in a table, falling back to a default vector
pub struct TableEmbedder {
    table: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    pub calls: AtomicUsize,
}

impl TableEmbedder {
    pub fn new(fallback: Vec<f32>) -> Self {
        Self {
            table: HashMap::new(),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.table.insert(text.to_string(), vector);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for TableEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .table
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }

    fn dimensions(&self) -> usize {
        self.fallback.len()
    }

    fn model_name(&self) -> &str {
        "table"
    }
}

/// Embedder whose service is down
pub struct DownEmbedder;

#[async_trait]
impl Embedder for DownEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(LexRagError::ExternalError("connection refused".to_string()))
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn model_name(&self) -> &str {
        "down"
    }
}

/// Index returning a fixed hit list and counting searches
pub struct FixedIndex {
    hits: Vec<SearchHit>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl FixedIndex {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            hits: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorIndex for FixedIndex {
    async fn search(&self, _collection: &str, _query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LexRagError::Retrieval("index unavailable".to_string()));
        }
        Ok(self.hits.iter().take(top_k).cloned().collect())
    }
}

pub fn hit(distance: f64, text: &str) -> SearchHit {
    SearchHit {
        distance,
        text: Some(text.to_string()),
        filename: None,
    }
}

/// What a scripted backend does when called
#[derive(Clone)]
pub enum Behavior {
    Answer(String),
    Fail(String),
    /// Sleep, then answer
    Slow(Duration, String),
}

/// Tracks the number of concurrent calls across a group of backends
#[derive(Default)]
pub struct ConcurrencyGauge {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ConcurrencyGauge {
    pub fn max(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Backend following a fixed script
pub struct ScriptedBackend {
    identifier: String,
    behavior: Behavior,
    gauge: Option<Arc<ConcurrencyGauge>>,
    pub calls: AtomicUsize,
    finished: AtomicUsize,
    pub prompts: std::sync::Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(identifier: &str, behavior: Behavior) -> Self {
        Self {
            identifier: identifier.to_string(),
            behavior,
            gauge: None,
            calls: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn answering(identifier: &str, answer: &str) -> Self {
        Self::new(identifier, Behavior::Answer(answer.to_string()))
    }

    pub fn failing(identifier: &str, detail: &str) -> Self {
        Self::new(identifier, Behavior::Fail(detail.to_string()))
    }

    pub fn with_gauge(mut self, gauge: Arc<ConcurrencyGauge>) -> Self {
        self.gauge = Some(gauge);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls that ran to the end instead of being dropped
    pub fn finished_count(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, prompt: &str, _options: Option<&DecodingOptions>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(ref gauge) = self.gauge {
            gauge.enter();
        }

        let outcome = match self.behavior {
            Behavior::Answer(ref text) => Ok(text.clone()),
            Behavior::Fail(ref detail) => Err(LexRagError::ExternalError(detail.clone())),
            Behavior::Slow(delay, ref text) => {
                tokio::time::sleep(delay).await;
                Ok(text.clone())
            }
        };

        if let Some(ref gauge) = self.gauge {
            gauge.exit();
        }
        self.finished.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Name and backend pairs in the shape the dispatcher takes
pub fn named(
    backends: &[(&str, &Arc<ScriptedBackend>)],
) -> Vec<(String, Arc<dyn GenerationBackend>)> {
    backends
        .iter()
        .map(|(name, backend)| {
            let backend = Arc::clone(*backend) as Arc<dyn GenerationBackend>;
            (name.to_string(), backend)
        })
        .collect()
}
