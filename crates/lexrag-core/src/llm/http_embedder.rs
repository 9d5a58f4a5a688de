//! HTTP-based embedder using an external embedding service

use super::cache::{embedding_cache_key, EmbeddingCache};
use super::{Embedder, OpenAiClient};
use crate::config::EmbeddingConfig;
use crate::error::{LexRagError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Embedder that uses an external HTTP service
pub struct HttpEmbedder {
    client: OpenAiClient,
    dimensions: usize,
    cache: EmbeddingCache,
}

impl HttpEmbedder {
    /// Create from configuration
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let client = OpenAiClient::new(
            config.url.clone(),
            config.model.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self {
            client,
            dimensions: config.dimensions,
            cache: EmbeddingCache::new(),
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let key = embedding_cache_key(self.client.model(), text);
        if let Some(vector) = self.cache.get(&key) {
            tracing::debug!("Cache hit for query embedding");
            return Ok(vector);
        }

        let vector = self.client.embed(text).await?;
        if vector.len() != self.dimensions {
            return Err(LexRagError::Embedding(format!(
                "model {} returned {} dimensions, expected {}",
                self.client.model(),
                vector.len(),
                self.dimensions
            )));
        }

        self.cache.set(key, vector.clone());
        tracing::debug!("Cached query embedding ({} entries)", self.cache.len());
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        self.client.model()
    }
}
