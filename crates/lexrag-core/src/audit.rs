//! Append-only audit log of answered queries
//!
//! Each record is one pretty-printed JSON object followed by a newline.
//! Writes are serialized so concurrent requests never interleave records.

use crate::config::AuditConfig;
use crate::error::{LexRagError, Result};
use crate::search::RetrievedDocument;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// How many documents of each kind a record keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditSampling {
    pub retrieved: usize,
    pub used: usize,
    pub unused: usize,
}

impl Default for AuditSampling {
    fn default() -> Self {
        Self {
            retrieved: 1,
            used: 0,
            unused: 0,
        }
    }
}

/// One logged interaction; never rewritten once appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: String,
    pub operation: String,
    pub query: String,
    #[serde(rename = "llm_output")]
    pub primary_answer: String,
    pub retrieved_docs: Vec<RetrievedDocument>,
    pub used_docs: Vec<RetrievedDocument>,
    pub unused_docs: Vec<RetrievedDocument>,
}

/// Appends audit records to a file
pub struct AuditLogger {
    path: PathBuf,
    sampling: AuditSampling,
    write_lock: Mutex<()>,
}

impl AuditLogger {
    pub fn new(path: impl Into<PathBuf>, sampling: AuditSampling) -> Self {
        Self {
            path: path.into(),
            sampling,
            write_lock: Mutex::new(()),
        }
    }

    /// Logger for the configuration, or `None` when auditing is disabled
    pub fn from_config(config: &AuditConfig) -> Option<Self> {
        config.enabled.then(|| {
            Self::new(
                config.path.clone(),
                AuditSampling {
                    retrieved: config.retrieved_sample,
                    used: config.used_sample,
                    unused: config.unused_sample,
                },
            )
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build the record for one interaction, applying the sampling limits
    pub fn record(
        &self,
        operation: &str,
        query: &str,
        retrieved: &[RetrievedDocument],
        primary_answer: &str,
        used: &[RetrievedDocument],
        unused: &[RetrievedDocument],
    ) -> AuditRecord {
        let sample = |docs: &[RetrievedDocument], n: usize| -> Vec<RetrievedDocument> {
            docs.iter().take(n).cloned().collect()
        };

        AuditRecord {
            timestamp: Utc::now().to_rfc3339(),
            operation: operation.to_string(),
            query: query.to_string(),
            primary_answer: primary_answer.to_string(),
            retrieved_docs: sample(retrieved, self.sampling.retrieved),
            used_docs: sample(used, self.sampling.used),
            unused_docs: sample(unused, self.sampling.unused),
        }
    }

    /// Append one interaction to the log
    pub async fn append(
        &self,
        operation: &str,
        query: &str,
        retrieved: &[RetrievedDocument],
        primary_answer: &str,
        used: &[RetrievedDocument],
        unused: &[RetrievedDocument],
    ) -> Result<()> {
        let record = self.record(operation, query, retrieved, primary_answer, used, unused);
        self.write(&record).await
    }

    /// Append an already-built record
    pub async fn write(&self, record: &AuditRecord) -> Result<()> {
        let mut buf = serde_json::to_string_pretty(record)?;
        buf.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| LexRagError::Audit(format!("{}: {}", self.path.display(), e)))?;

        file.write_all(buf.as_bytes())
            .await
            .map_err(|e| LexRagError::Audit(format!("{}: {}", self.path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| LexRagError::Audit(format!("{}: {}", self.path.display(), e)))?;

        Ok(())
    }
}

/// Parse a log file back into records
pub fn read_records(content: &str) -> Result<Vec<AuditRecord>> {
    serde_json::Deserializer::from_str(content)
        .into_iter::<AuditRecord>()
        .map(|r| r.map_err(LexRagError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> RetrievedDocument {
        RetrievedDocument {
            text: text.to_string(),
            filename: Some(format!("{}.txt", text)),
            score: 1.0,
        }
    }

    #[test]
    fn test_default_sampling_keeps_one_retrieved_and_no_evidence() {
        let logger = AuditLogger::new("unused.json", AuditSampling::default());
        let docs = vec![doc("a"), doc("b"), doc("c")];
        let record = logger.record("ipc", "q", &docs, "answer", &docs[..1], &docs[1..]);

        assert_eq!(record.retrieved_docs, vec![docs[0].clone()]);
        assert!(record.used_docs.is_empty());
        assert!(record.unused_docs.is_empty());
    }

    #[test]
    fn test_record_serializes_with_log_keys() {
        let logger = AuditLogger::new("unused.json", AuditSampling::default());
        let record = logger.record("precedent", "q", &[], "the answer", &[], &[]);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["llm_output"], "the answer");
        assert_eq!(json["query"], "q");
        assert!(json["retrieved_docs"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.json");
        let logger = AuditLogger::new(&path, AuditSampling::default());

        logger.append("ipc", "first", &[], "a1", &[], &[]).await.unwrap();
        logger.append("ipc", "second", &[], "a2", &[], &[]).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("}\n"));
        let records = read_records(&content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].query, "first");
        assert_eq!(records[1].query, "second");
    }

    #[tokio::test]
    async fn test_unwritable_path_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let logger = AuditLogger::new(dir.path(), AuditSampling::default());

        let err = logger.append("ipc", "q", &[], "a", &[], &[]).await.unwrap_err();
        assert!(matches!(err, LexRagError::Audit(_)));
    }
}
