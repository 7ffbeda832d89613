//! Keyring access for identity discovery
//!
//! The setup procedure only reads secret identities; it never writes to the
//! keyring. [`gnupg::GnuPg`] talks to a local GnuPG install and
//! [`StaticKeyring`] serves a fixed listing.

pub mod gnupg;

pub use gnupg::GnuPg;

use serde::{Deserialize, Serialize};

use crate::types::error::Result;

/// What a key may be used for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCapabilities {
    pub encrypt: bool,
    pub sign: bool,
    pub certify: bool,
    pub authenticate: bool,
}

impl KeyCapabilities {
    /// Parse a GnuPG capability string such as `scESC`
    pub fn from_flags(flags: &str) -> Self {
        let mut caps = Self::default();
        caps.merge_flags(flags);
        caps
    }

    pub fn merge_flags(&mut self, flags: &str) {
        for c in flags.chars() {
            match c.to_ascii_lowercase() {
                'e' => self.encrypt = true,
                's' => self.sign = true,
                'c' => self.certify = true,
                'a' => self.authenticate = true,
                _ => {}
            }
        }
    }
}

/// A `Name <email>` pair bound to a key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub name: String,
    pub email: String,
}

/// A secret key found in the keyring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoIdentity {
    pub key_id: String,
    /// `YYYY-MM-DD`
    pub revocation_date: Option<String>,
    pub capabilities: KeyCapabilities,
    pub user_identities: Vec<UserIdentity>,
}

impl CryptoIdentity {
    /// Revoked (or expired) on or before `today`, both as `YYYY-MM-DD`
    pub fn is_revoked_on(&self, today: &str) -> bool {
        self.revocation_date
            .as_deref()
            .is_some_and(|date| date <= today)
    }
}

pub trait Keyring {
    /// Whether the keyring can be queried at all
    fn is_available(&self) -> bool;

    /// Secret identities, in keyring order
    fn list_secret_identities(&self) -> Result<Vec<CryptoIdentity>>;
}

/// Keyring with a fixed listing
#[derive(Debug, Clone, Default)]
pub struct StaticKeyring {
    available: bool,
    identities: Vec<CryptoIdentity>,
}

impl StaticKeyring {
    pub fn new(identities: Vec<CryptoIdentity>) -> Self {
        Self {
            available: true,
            identities,
        }
    }

    /// A keyring whose tooling is missing
    pub fn unavailable() -> Self {
        Self::default()
    }
}

impl Keyring for StaticKeyring {
    fn is_available(&self) -> bool {
        self.available
    }

    fn list_secret_identities(&self) -> Result<Vec<CryptoIdentity>> {
        Ok(self.identities.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_flags() {
        let caps = KeyCapabilities::from_flags("scESC");
        assert!(caps.encrypt && caps.sign && caps.certify);
        assert!(!caps.authenticate);

        let sign_only = KeyCapabilities::from_flags("scSC");
        assert!(!sign_only.encrypt);
    }

    #[test]
    fn test_revocation_compares_iso_dates() {
        let mut identity = CryptoIdentity {
            key_id: "A".into(),
            revocation_date: Some("2000-01-01".into()),
            capabilities: KeyCapabilities::default(),
            user_identities: Vec::new(),
        };
        assert!(identity.is_revoked_on("2026-10-19"));
        assert!(identity.is_revoked_on("2000-01-01"));

        identity.revocation_date = Some("2030-01-01".into());
        assert!(!identity.is_revoked_on("2026-10-19"));

        identity.revocation_date = None;
        assert!(!identity.is_revoked_on("2026-10-19"));
    }
}
