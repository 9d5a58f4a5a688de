//! Embedded vector index
//!
//! SQLite storage of chunk text, optional filename and embedding BLOB per
//! collection, searched by exact squared-L2 scan.

mod schema;
mod stats;
pub mod vectors;

pub use schema::Database;
pub use stats::DatabaseStats;
pub use vectors::CollectionInfo;
