//! Index statistics

use super::{CollectionInfo, Database};
use crate::error::Result;

/// Index stats
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatabaseStats {
    pub collection_count: usize,
    pub chunk_count: usize,
    pub collections: Vec<CollectionInfo>,
}

impl Database {
    /// Get index statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT c.name, c.dimensions, c.has_filename,
                    (SELECT COUNT(*) FROM chunks WHERE collection = c.name)
             FROM collections c ORDER BY c.name",
        )?;

        let collections = stmt
            .query_map([], |row| {
                Ok(CollectionInfo {
                    name: row.get(0)?,
                    dimensions: row.get::<_, i64>(1)? as usize,
                    has_filename: row.get(2)?,
                    chunk_count: row.get::<_, i64>(3)? as usize,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(DatabaseStats {
            collection_count: collections.len(),
            chunk_count: collections.iter().map(|c| c.chunk_count).sum(),
            collections,
        })
    }
}
