//! Capabilities the setup procedure needs from the local mail store

use std::path::PathBuf;

use crate::types::error::Result;

/// The local mailbox that receives drafts and outgoing mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMailboxInfo {
    pub id: String,
    pub path: PathBuf,
}

/// Creates the local mailbox. Safe to call on every run.
pub trait MailboxInitializer {
    fn open_local_mailbox(&self) -> Result<LocalMailboxInfo>;
}

/// Reports whether a search index already exists on disk
pub trait IndexProbe {
    fn has_built_index(&self) -> Result<bool>;
}
