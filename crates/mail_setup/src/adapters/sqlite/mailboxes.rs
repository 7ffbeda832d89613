//! Local Maildir creation and registration

use rusqlite::{params, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::DbPool;
use crate::storage::{LocalMailboxInfo, MailboxInitializer};
use crate::types::error::Result;

const MAILDIR_SUBDIRS: [&str; 3] = ["cur", "new", "tmp"];

pub struct LocalMailbox {
    pool: DbPool,
    path: PathBuf,
}

impl LocalMailbox {
    pub fn new(pool: DbPool, path: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MailboxInitializer for LocalMailbox {
    fn open_local_mailbox(&self) -> Result<LocalMailboxInfo> {
        for sub in MAILDIR_SUBDIRS {
            fs::create_dir_all(self.path.join(sub))?;
        }

        let path = self.path.to_string_lossy().to_string();
        let conn = self.pool.get()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO mailboxes (id, path, kind, local, created_at)
             VALUES (?1, ?2, 'maildir', 1, ?3)",
            params![
                uuid::Uuid::new_v4().to_string(),
                path,
                chrono::Utc::now().timestamp_millis()
            ],
        )?;

        let id: String = conn.query_row(
            "SELECT id FROM mailboxes WHERE path = ?1",
            params![path],
            |row| row.get(0),
        )?;

        if inserted > 0 {
            info!("Created local mailbox at {:?}", self.path);
        } else {
            debug!("Local mailbox already registered at {:?}", self.path);
        }

        Ok(LocalMailboxInfo {
            id,
            path: self.path.clone(),
        })
    }
}

/// Id of the registered local mailbox, if any
pub fn local_mailbox_id(pool: &DbPool) -> Result<Option<String>> {
    let conn = pool.get()?;
    let id = conn
        .query_row(
            "SELECT id FROM mailboxes WHERE local = 1 ORDER BY created_at LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::memory_pool;

    #[test]
    fn test_open_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let pool = memory_pool().unwrap();
        let mailbox = LocalMailbox::new(pool.clone(), dir.path().join("mail"));

        let first = mailbox.open_local_mailbox().unwrap();
        let second = mailbox.open_local_mailbox().unwrap();

        assert_eq!(first, second);
        assert!(dir.path().join("mail").join("new").is_dir());
        assert_eq!(local_mailbox_id(&pool).unwrap(), Some(first.id));
    }

    #[test]
    fn test_no_mailbox_before_open() {
        let pool = memory_pool().unwrap();
        assert_eq!(local_mailbox_id(&pool).unwrap(), None);
    }
}
