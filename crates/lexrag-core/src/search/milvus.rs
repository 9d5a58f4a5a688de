//! Milvus vector index over the REST v2 API

use super::{SearchHit, VectorIndex};
use crate::error::{LexRagError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

/// Fields requested from every hit, when the collection has them
const PREFERRED_FIELDS: &[&str] = &["text", "filename"];

/// Milvus client
pub struct MilvusIndex {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    anns_field: String,
    nprobe: u32,
    /// Output fields available per collection, learned on first use
    fields: RwLock<HashMap<String, Vec<String>>>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Deserialize)]
struct DescribeData {
    #[serde(default)]
    fields: Vec<FieldSchema>,
}

#[derive(Deserialize)]
struct FieldSchema {
    name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    collection_name: &'a str,
    data: Vec<&'a [f32]>,
    anns_field: &'a str,
    limit: usize,
    output_fields: &'a [String],
    search_params: Value,
}

impl MilvusIndex {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        anns_field: impl Into<String>,
        nprobe: u32,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(LexRagError::Http)?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            anns_field: anns_field.into(),
            nprobe,
            fields: RwLock::new(HashMap::new()),
        })
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http_client.post(&url).json(body);
        if let Some(ref token) = self.token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let response = req.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LexRagError::Retrieval(format!(
                "Milvus error (HTTP {}): {}",
                status, body
            )));
        }

        let envelope: Envelope<T> = response.json().await?;
        if envelope.code != 0 {
            return Err(LexRagError::Retrieval(format!(
                "Milvus error {}: {}",
                envelope.code,
                envelope.message.unwrap_or_default()
            )));
        }

        envelope
            .data
            .ok_or_else(|| LexRagError::Retrieval(format!("Milvus returned no data for {}", path)))
    }

    /// Preferred output fields that the collection schema actually has
    async fn output_fields(&self, collection: &str) -> Result<Vec<String>> {
        if let Some(fields) = self
            .fields
            .read()
            .ok()
            .and_then(|cache| cache.get(collection).cloned())
        {
            return Ok(fields);
        }

        let described: DescribeData = self
            .post(
                "/v2/vectordb/collections/describe",
                &serde_json::json!({ "collectionName": collection }),
            )
            .await?;

        let available: Vec<&str> = described.fields.iter().map(|f| f.name.as_str()).collect();
        let fields: Vec<String> = PREFERRED_FIELDS
            .iter()
            .filter(|name| available.contains(*name))
            .map(|name| name.to_string())
            .collect();

        tracing::debug!("Milvus collection {} exposes {:?}", collection, fields);

        if let Ok(mut cache) = self.fields.write() {
            cache.insert(collection.to_string(), fields.clone());
        }
        Ok(fields)
    }
}

#[async_trait]
impl VectorIndex for MilvusIndex {
    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        let output_fields = self.output_fields(collection).await?;
        let has_filename = output_fields.iter().any(|f| f == "filename");

        let request = SearchRequest {
            collection_name: collection,
            data: vec![query],
            anns_field: &self.anns_field,
            limit: top_k,
            output_fields: &output_fields,
            search_params: serde_json::json!({
                "metricType": "L2",
                "params": { "nprobe": self.nprobe }
            }),
        };

        let rows: Vec<HashMap<String, Value>> =
            self.post("/v2/vectordb/entities/search", &request).await?;

        let hits = rows
            .into_iter()
            .map(|row| -> Result<SearchHit> {
                let distance = row.get("distance").and_then(Value::as_f64).ok_or_else(|| {
                    LexRagError::Retrieval("Milvus hit without distance".to_string())
                })?;
                let text = row.get("text").and_then(Value::as_str).map(str::to_string);
                let filename = if has_filename {
                    row.get("filename").and_then(Value::as_str).map(str::to_string)
                } else {
                    None
                };
                Ok(SearchHit {
                    distance,
                    text,
                    filename,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(hits)
    }
}
