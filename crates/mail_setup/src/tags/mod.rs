//! Tag taxonomy
//!
//! - `taxonomy`: the canonical system and attribute tags
//! - `reconcile`: bringing a [`TagStore`] in line with the taxonomy

pub mod reconcile;
pub mod taxonomy;

pub use reconcile::{reconcile_tags, TagReconcileReport};

use serde::{Deserialize, Serialize};

use crate::types::error::Result;

/// Semantic category of a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Unread,
    Inbox,
    Blank,
    Drafts,
    Outbox,
    Sent,
    Spam,
    Ham,
    Trash,
    Tag,
    Replied,
    #[serde(rename = "fwded")]
    Forwarded,
    Tagged,
    Read,
    Attribute,
}

impl TagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Inbox => "inbox",
            Self::Blank => "blank",
            Self::Drafts => "drafts",
            Self::Outbox => "outbox",
            Self::Sent => "sent",
            Self::Spam => "spam",
            Self::Ham => "ham",
            Self::Trash => "trash",
            Self::Tag => "tag",
            Self::Replied => "replied",
            Self::Forwarded => "fwded",
            Self::Tagged => "tagged",
            Self::Read => "read",
            Self::Attribute => "attribute",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let kind = match s {
            "unread" => Self::Unread,
            "inbox" => Self::Inbox,
            "blank" => Self::Blank,
            "drafts" => Self::Drafts,
            "outbox" => Self::Outbox,
            "sent" => Self::Sent,
            "spam" => Self::Spam,
            "ham" => Self::Ham,
            "trash" => Self::Trash,
            "tag" => Self::Tag,
            "replied" => Self::Replied,
            "fwded" => Self::Forwarded,
            "tagged" => Self::Tagged,
            "read" => Self::Read,
            "attribute" => Self::Attribute,
            _ => return None,
        };
        Some(kind)
    }
}

/// Where a tag shows up in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Pinned in the sidebar
    Priority,
    /// Never shown
    Invisible,
    /// Shown alongside related views
    Contextual,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::Invisible => "invisible",
            Self::Contextual => "contextual",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "priority" => Some(Self::Priority),
            "invisible" => Some(Self::Invisible),
            "contextual" => Some(Self::Contextual),
            _ => None,
        }
    }
}

/// Everything about a tag except its identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAttributes {
    pub kind: TagKind,
    pub display: DisplayMode,
    pub display_order: Option<i64>,
    /// Saved search backing a virtual tag
    pub search_terms: Option<String>,
    /// User may apply it manually
    pub label: bool,
    /// Presence hides the message from normal views
    pub flag_hides: bool,
    pub flag_editable: bool,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub template: Option<String>,
    pub name: String,
}

impl TagAttributes {
    /// Attributes of a freshly created, not yet reconciled tag
    pub fn fresh(key: &str) -> Self {
        Self {
            kind: TagKind::Tag,
            display: DisplayMode::Contextual,
            display_order: None,
            search_terms: None,
            label: true,
            flag_hides: false,
            flag_editable: false,
            color: None,
            icon: None,
            template: None,
            name: key.to_string(),
        }
    }
}

/// A stored tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub key: String,
    pub attributes: TagAttributes,
}

/// Persistence for tags, keyed by their stable `key`
pub trait TagStore {
    fn tag_exists(&self, key: &str) -> Result<bool>;

    /// Create a tag with [`TagAttributes::fresh`]. Errors if the key is taken.
    fn create_tag(&self, key: &str) -> Result<Tag>;

    /// Overwrite every attribute of an existing tag
    fn set_tag_attributes(&self, key: &str, attributes: &TagAttributes) -> Result<()>;

    fn get_tag(&self, key: &str) -> Result<Option<Tag>>;

    fn list_tags(&self) -> Result<Vec<Tag>>;
}
