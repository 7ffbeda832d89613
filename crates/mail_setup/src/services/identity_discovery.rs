//! Seed profiles and the encryption policy from existing secret keys
//!
//! Someone who already has secret keys presumably wants to send from the
//! addresses on them. Nothing here ever removes a profile, replaces a
//! recipient key or lowers the crypto policy.

use tracing::{debug, info};

use super::Notices;
use crate::config::{AppConfig, CryptoPolicy, UserProfile};
use crate::keyring::{CryptoIdentity, Keyring};

/// What discovery changed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// False when the keyring could not be queried
    pub keyring_available: bool,
    /// Non-revoked key ids, in keyring order
    pub accepted_keys: Vec<String>,
    pub added_profiles: Vec<String>,
    pub recipient_set: Option<String>,
}

/// Query the keyring and fold its identities into `config`
pub fn discover_identities(
    config: &mut AppConfig,
    keyring: &dyn Keyring,
    today: &str,
    notices: &mut Notices,
) -> DiscoveryReport {
    let mut report = DiscoveryReport::default();

    if !keyring.is_available() {
        notices.warning("Oh no, PGP/GPG support is unavailable!");
        return report;
    }

    let identities = match keyring.list_secret_identities() {
        Ok(identities) => identities,
        Err(e) => {
            notices.warning(format!("Could not list secret keys: {}", e));
            return report;
        }
    };
    report.keyring_available = true;

    for identity in &identities {
        if identity.is_revoked_on(today) {
            debug!(key_id = %identity.key_id, "Skipping revoked or expired key");
            continue;
        }
        apply_identity(config, identity, notices, &mut report);
    }

    if report.accepted_keys.is_empty() {
        // Generating a key for the user is left to a later, interactive step
        info!("No usable secret keys found");
    }

    report
}

/// Fold one accepted identity into `config`
pub fn apply_identity(
    config: &mut AppConfig,
    identity: &CryptoIdentity,
    notices: &mut Notices,
    report: &mut DiscoveryReport,
) {
    report.accepted_keys.push(identity.key_id.clone());

    for uid in &identity.user_identities {
        if uid.email.is_empty() || config.has_profile(&uid.email) {
            continue;
        }
        config.profiles.push(UserProfile {
            email: uid.email.clone(),
            name: uid.name.clone(),
        });
        debug!(email = %uid.email, key_id = %identity.key_id, "Added profile");
        report.added_profiles.push(uid.email.clone());
    }

    if !config.prefs.has_recipient() && identity.capabilities.encrypt {
        config.prefs.gpg_recipient = Some(identity.key_id.clone());
        notices.notify(format!("Encrypting config to {}", identity.key_id));
        report.recipient_set = Some(identity.key_id.clone());
    }

    if config.prefs.crypto_policy == CryptoPolicy::None {
        config.prefs.crypto_policy = CryptoPolicy::SignOnly;
    }
}
