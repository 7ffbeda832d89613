//! Application configuration
//!
//! The configuration tree is an explicit value: it is loaded from a
//! [`ConfigStore`], handed to each setup stage by `&mut`, and written back
//! once at the end of the run.

mod store;

pub use store::{ConfigStore, MemoryConfigStore, TomlConfigStore};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "MAIL_SETUP_CONFIG";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "MAIL_SETUP_DATA";

const APP_DIR: &str = "mail-setup";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sys: SysConfig,

    #[serde(default)]
    pub prefs: Prefs,

    /// Sending identities, at most one per email address
    #[serde(default)]
    pub profiles: Vec<UserProfile>,
}

/// System-level settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SysConfig {
    /// Restricted mode: setup refuses to touch anything
    #[serde(default)]
    pub lockdown: bool,

    /// Active optional modules, no duplicates
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Names of migrations that already ran
    #[serde(default)]
    pub migrations: Vec<String>,

    /// Local Maildir created on first run
    pub local_mailbox: Option<PathBuf>,
}

/// User preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prefs {
    /// Key id the config and index are encrypted to
    pub gpg_recipient: Option<String>,

    #[serde(default)]
    pub crypto_policy: CryptoPolicy,

    /// Obfuscation salt for the search index. Never regenerated once set.
    pub obfuscate_index: Option<String>,

    #[serde(default)]
    pub index_encrypted: bool,

    #[serde(default)]
    pub autotag: Vec<AutotagRule>,

    #[serde(default)]
    pub vcard: VcardPrefs,
}

/// Default crypto behaviour for outgoing mail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CryptoPolicy {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "openpgp-sign")]
    SignOnly,
    #[serde(rename = "openpgp-sign-encrypt")]
    SignAndEncrypt,
}

impl CryptoPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SignOnly => "openpgp-sign",
            Self::SignAndEncrypt => "openpgp-sign-encrypt",
        }
    }
}

/// A sending identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// Automatic tagging rule bound to a classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutotagRule {
    pub match_tag: String,
    pub unsure_tag: String,
    pub tagger: String,
    pub trainer: String,
    #[serde(default)]
    pub exclude_tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VcardPrefs {
    #[serde(default)]
    pub importers: VcardImporters,
}

/// Contact importers, each list holding at most the configured instances
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VcardImporters {
    #[serde(default)]
    pub gravatar: Vec<GravatarImporter>,

    #[serde(default)]
    pub gpg: Vec<GpgImporter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GravatarImporter {
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpgImporter {
    pub active: bool,
    pub gpg_home: PathBuf,
}

impl Prefs {
    /// A recipient key is configured. An empty id counts as unset.
    pub fn has_recipient(&self) -> bool {
        self.gpg_recipient.as_deref().is_some_and(|r| !r.is_empty())
    }

    pub fn has_index_salt(&self) -> bool {
        self.obfuscate_index.as_deref().is_some_and(|s| !s.is_empty())
    }
}

impl AppConfig {
    /// Whether a profile for this email already exists
    pub fn has_profile(&self, email: &str) -> bool {
        self.profiles.iter().any(|p| p.email == email)
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.sys.plugins.iter().any(|p| p == name)
    }
}

/// Append `default()` to `list` only if the list is empty.
///
/// Returns true when an entry was added.
pub fn ensure_present<T>(list: &mut Vec<T>, default: impl FnOnce() -> T) -> bool {
    if list.is_empty() {
        list.push(default());
        true
    } else {
        false
    }
}

/// Config file location: `$MAIL_SETUP_CONFIG`, else the XDG config dir
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// Data directory: `$MAIL_SETUP_DATA`, else the local data dir
pub fn default_data_dir() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(DATA_DIR_ENV) {
        return Some(PathBuf::from(path));
    }

    dirs::data_local_dir().map(|dir| dir.join(APP_DIR))
}
