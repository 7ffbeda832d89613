pub mod mailboxes;
pub mod pool;
pub mod schema;
pub mod search_index;
pub mod tags;

// Re-exported so callers can write `adapters::sqlite::DbPool`
pub use mailboxes::LocalMailbox;
pub use pool::{create_pool, memory_pool, open_store, DbPool};
pub use search_index::SearchIndex;
pub use tags::SqliteTagStore;
