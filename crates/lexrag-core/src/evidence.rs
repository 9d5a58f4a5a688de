//! Evidence reconciliation
//!
//! Splits retrieved documents into those an answer appears to draw on and
//! those it does not. A document counts as used when the first
//! `FINGERPRINT_CHARS` characters of its lower-cased text occur verbatim in
//! the lower-cased answer. This is a heuristic: short or generic openings
//! produce false positives.

use crate::search::RetrievedDocument;
use serde::Serialize;

/// Length of the leading-text fingerprint, in characters
pub const FINGERPRINT_CHARS: usize = 50;

/// Stable partition of the retrieved documents
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvidencePartition {
    pub used: Vec<RetrievedDocument>,
    pub unused: Vec<RetrievedDocument>,
}

/// Lower-cased leading text of a document
pub fn fingerprint(text: &str) -> String {
    text.to_lowercase().chars().take(FINGERPRINT_CHARS).collect()
}

/// Partition `documents` by whether their fingerprint occurs in `answer`
pub fn reconcile(answer: &str, documents: &[RetrievedDocument]) -> EvidencePartition {
    let answer = answer.to_lowercase();

    let (used, unused) = documents
        .iter()
        .cloned()
        .partition(|doc| answer.contains(fingerprint(&doc.text).as_str()));

    EvidencePartition { used, unused }
}
