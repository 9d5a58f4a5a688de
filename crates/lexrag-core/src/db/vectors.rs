//! Vector storage operations
//!
//! Stores embeddings as BLOBs and computes squared Euclidean distance in Rust.

use super::Database;
use crate::error::{LexRagError, Result};
use crate::search::{SearchHit, VectorIndex};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

/// Collection schema as recorded in the index
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CollectionInfo {
    pub name: String,
    pub dimensions: usize,
    /// Whether chunks in this collection expose a `filename` field
    pub has_filename: bool,
    pub chunk_count: usize,
}

impl Database {
    /// Register a collection; re-registering with the same schema is a no-op
    pub fn create_collection(
        &self,
        name: &str,
        dimensions: usize,
        has_filename: bool,
    ) -> Result<()> {
        if let Some(existing) = self.collection_info(name)? {
            if existing.dimensions != dimensions || existing.has_filename != has_filename {
                return Err(LexRagError::Config(format!(
                    "collection '{}' already exists with a different schema",
                    name
                )));
            }
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        self.conn()?.execute(
            "INSERT INTO collections (name, dimensions, has_filename, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, dimensions as i64, has_filename, now],
        )?;
        Ok(())
    }

    /// Insert one chunk; `filename` is discarded when the schema lacks the field
    pub fn insert_chunk(
        &self,
        collection: &str,
        text: Option<&str>,
        filename: Option<&str>,
        embedding: &[f32],
    ) -> Result<i64> {
        let info = self
            .collection_info(collection)?
            .ok_or_else(|| LexRagError::Config(format!("unknown collection '{}'", collection)))?;

        if embedding.len() != info.dimensions {
            return Err(LexRagError::Config(format!(
                "embedding has {} dimensions, collection '{}' expects {}",
                embedding.len(),
                collection,
                info.dimensions
            )));
        }

        let filename = if info.has_filename { filename } else { None };
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO chunks (collection, text, filename, embedding) VALUES (?1, ?2, ?3, ?4)",
            params![collection, text, filename, embedding_to_bytes(embedding)],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Look up a collection's schema and size
    pub fn collection_info(&self, name: &str) -> Result<Option<CollectionInfo>> {
        let info = self
            .conn()?
            .query_row(
                "SELECT c.name, c.dimensions, c.has_filename,
                        (SELECT COUNT(*) FROM chunks WHERE collection = c.name)
                 FROM collections c WHERE c.name = ?1",
                params![name],
                |row| {
                    Ok(CollectionInfo {
                        name: row.get(0)?,
                        dimensions: row.get::<_, i64>(1)? as usize,
                        has_filename: row.get(2)?,
                        chunk_count: row.get::<_, i64>(3)? as usize,
                    })
                },
            )
            .optional()?;
        Ok(info)
    }

    /// Exact top-K search by squared Euclidean distance, closest first
    pub fn search_l2(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        let info = self.collection_info(collection)?.ok_or_else(|| {
            LexRagError::Retrieval(format!("collection '{}' not found", collection))
        })?;

        if query.len() != info.dimensions {
            return Err(LexRagError::Retrieval(format!(
                "query vector has {} dimensions, collection '{}' expects {}",
                query.len(),
                collection,
                info.dimensions
            )));
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT text, filename, embedding FROM chunks WHERE collection = ?1 ORDER BY id",
        )?;

        let mut scored = stmt
            .query_map(params![collection], |row| {
                let text: Option<String> = row.get(0)?;
                let filename: Option<String> = row.get(1)?;
                let bytes: Vec<u8> = row.get(2)?;
                Ok((text, filename, bytes))
            })?
            .map(|row| {
                row.map(|(text, filename, bytes)| SearchHit {
                    distance: squared_l2(query, &bytes_to_embedding(&bytes)),
                    text,
                    filename: if info.has_filename { filename } else { None },
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(top_k);
        Ok(scored)
    }
}

#[async_trait]
impl VectorIndex for Database {
    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        self.search_l2(collection, query, top_k)
    }
}

/// Squared Euclidean distance
pub fn squared_l2(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = (*x as f64) - (*y as f64);
            d * d
        })
        .sum()
}

/// Convert embedding to bytes for storage
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes back to embedding
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    #[test]
    fn test_squared_l2() {
        assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(squared_l2(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_embedding_bytes() {
        let embedding = vec![0.5f32, -1.25, 3.0];
        assert_eq!(bytes_to_embedding(&embedding_to_bytes(&embedding)), embedding);
    }

    #[test]
    fn test_search_orders_by_distance_and_limits() {
        let db = db();
        db.create_collection("IPC_collection", 2, true).unwrap();
        db.insert_chunk("IPC_collection", Some("far"), Some("far.txt"), &[10.0, 0.0])
            .unwrap();
        db.insert_chunk("IPC_collection", Some("near"), Some("near.txt"), &[1.0, 0.0])
            .unwrap();
        db.insert_chunk("IPC_collection", Some("mid"), None, &[3.0, 0.0])
            .unwrap();

        let hits = db.search_l2("IPC_collection", &[0.0, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text.as_deref(), Some("near"));
        assert_eq!(hits[0].distance, 1.0);
        assert_eq!(hits[0].filename.as_deref(), Some("near.txt"));
        assert_eq!(hits[1].text.as_deref(), Some("mid"));
        assert_eq!(hits[1].filename, None);
    }

    #[test]
    fn test_filename_hidden_when_schema_lacks_field() {
        let db = db();
        db.create_collection("Precedence_collection", 1, false).unwrap();
        db.insert_chunk("Precedence_collection", Some("case"), Some("x.txt"), &[0.0])
            .unwrap();

        let hits = db.search_l2("Precedence_collection", &[0.0], 3).unwrap();
        assert_eq!(hits[0].filename, None);
    }

    #[test]
    fn test_unknown_collection_and_dimension_mismatch() {
        let db = db();
        assert!(matches!(
            db.search_l2("missing", &[0.0], 3),
            Err(LexRagError::Retrieval(_))
        ));

        db.create_collection("c", 2, true).unwrap();
        assert!(matches!(
            db.search_l2("c", &[0.0], 3),
            Err(LexRagError::Retrieval(_))
        ));
        assert!(db.insert_chunk("c", Some("t"), None, &[0.0]).is_err());
    }

    #[test]
    fn test_create_collection_is_idempotent() {
        let db = db();
        db.create_collection("c", 2, true).unwrap();
        db.create_collection("c", 2, true).unwrap();
        assert!(db.create_collection("c", 3, true).is_err());
    }
}
