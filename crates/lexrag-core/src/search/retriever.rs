//! Query retrieval with per-request score normalization

use super::{RetrievedDocument, VectorIndex};
use crate::error::{LexRagError, Result};
use crate::llm::Embedder;
use std::sync::Arc;
use std::time::Instant;

/// Embeds a query and searches one collection of the vector index
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Retrieve up to `top_k` documents, closest first
    ///
    /// Scores are normalized over the whole hit batch, including hits that are
    /// dropped afterwards for having no text. Order is the index's distance
    /// order; normalization never re-sorts.
    pub async fn retrieve(
        &self,
        collection: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>> {
        let start = Instant::now();

        let vector = self.embedder.embed(query).await.map_err(|e| match e {
            LexRagError::Embedding(_) => e,
            other => LexRagError::Embedding(other.to_string()),
        })?;

        let hits = self
            .index
            .search(collection, &vector, top_k)
            .await
            .map_err(|e| match e {
                LexRagError::Retrieval(_) => e,
                other => LexRagError::Retrieval(other.to_string()),
            })?;

        let distances: Vec<f64> = hits.iter().map(|h| h.distance).collect();
        let scores = normalize_scores(&distances);

        let documents: Vec<RetrievedDocument> = hits
            .into_iter()
            .zip(scores)
            .filter_map(|(hit, score)| match hit.text {
                Some(text) if !text.is_empty() => Some(RetrievedDocument {
                    text,
                    filename: hit.filename,
                    score,
                }),
                _ => None,
            })
            .take(top_k)
            .collect();

        tracing::debug!(
            "Retrieved {} documents from {} in {}ms",
            documents.len(),
            collection,
            start.elapsed().as_millis()
        );

        Ok(documents)
    }
}

/// Map raw distances to relevance scores in [0, 1], rounded to 4 decimals
///
/// The closest distance maps to 1.0 and the farthest to 0.0. When every
/// distance is equal the range is taken as 1.0, so all scores are 1.0.
pub fn normalize_scores(distances: &[f64]) -> Vec<f64> {
    if distances.is_empty() {
        return Vec::new();
    }

    let min = distances.iter().copied().fold(f64::INFINITY, f64::min);
    let max = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = if max - min == 0.0 { 1.0 } else { max - min };

    distances
        .iter()
        .map(|d| round4(1.0 - (d - min) / range))
        .collect()
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
