use rusqlite::params;

use super::DbPool;
use crate::storage::IndexProbe;
use crate::types::error::Result;

/// Search index postings table
pub struct SearchIndex {
    pool: DbPool,
}

impl SearchIndex {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record that `message_id` contains `term`
    pub fn add_posting(&self, term: &str, message_id: &str) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT OR IGNORE INTO search_index (term, message_id) VALUES (?1, ?2)",
            params![term, message_id],
        )?;
        Ok(())
    }
}

impl IndexProbe for SearchIndex {
    fn has_built_index(&self) -> Result<bool> {
        let conn = self.pool.get()?;
        let built: bool =
            conn.query_row("SELECT EXISTS(SELECT 1 FROM search_index)", [], |row| row.get(0))?;
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::memory_pool;

    #[test]
    fn test_index_built_after_first_posting() {
        let index = SearchIndex::new(memory_pool().unwrap());
        assert!(!index.has_built_index().unwrap());

        index.add_posting("invoice", "<1@example.com>").unwrap();
        assert!(index.has_built_index().unwrap());
    }
}
