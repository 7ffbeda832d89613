use rusqlite::Connection;

use crate::types::error::Result;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS tags (
            id              TEXT PRIMARY KEY,   -- UUID
            key             TEXT NOT NULL UNIQUE,
            kind            TEXT NOT NULL,
            display         TEXT NOT NULL,
            display_order   INTEGER,
            search_terms    TEXT,               -- saved search for virtual tags
            label           INTEGER NOT NULL DEFAULT 1,
            flag_hides      INTEGER NOT NULL DEFAULT 0,
            flag_editable   INTEGER NOT NULL DEFAULT 0,
            color           TEXT,
            icon            TEXT,
            template        TEXT,
            name            TEXT NOT NULL,
            created_at      INTEGER NOT NULL,   -- unix epoch ms
            updated_at      INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS mailboxes (
            id              TEXT PRIMARY KEY,   -- UUID
            path            TEXT NOT NULL UNIQUE,
            kind            TEXT NOT NULL,      -- 'maildir'
            local           INTEGER NOT NULL DEFAULT 0,
            created_at      INTEGER NOT NULL
        );

        -- Search index postings. Empty until the first indexing run.
        CREATE TABLE IF NOT EXISTS search_index (
            term            TEXT NOT NULL,
            message_id      TEXT NOT NULL,
            PRIMARY KEY (term, message_id)
        );

        CREATE INDEX IF NOT EXISTS idx_mailboxes_local ON mailboxes(local);
    ")?;

    Ok(())
}
