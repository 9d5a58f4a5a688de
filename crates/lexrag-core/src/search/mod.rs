//! Retrieval
//!
//! Provides:
//! - The `VectorIndex` seam over the embedded SQLite index and Milvus
//! - The `Retriever` that embeds a query, searches one collection and
//!   normalizes distances into per-request relevance scores

mod milvus;
mod retriever;

pub use milvus::MilvusIndex;
pub use retriever::{normalize_scores, Retriever};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Approximate or exact nearest-neighbour search over stored vectors
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Top-K hits in `collection` by squared L2 distance, closest first
    async fn search(&self, collection: &str, query: &[f32], top_k: usize)
        -> Result<Vec<SearchHit>>;
}

/// Raw hit returned by a vector index
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Squared Euclidean distance (lower is closer)
    pub distance: f64,
    pub text: Option<String>,
    /// Present only when the collection schema exposes a filename field
    pub filename: Option<String>,
}

/// Retrieved chunk with its per-request relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub text: String,
    pub filename: Option<String>,
    /// Normalized to [0, 1] within one result set; not comparable across requests
    pub score: f64,
}
