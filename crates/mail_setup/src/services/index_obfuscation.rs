//! One-time search index obfuscation
//!
//! The salt is bound into every index entry written after it is set, so it
//! can only be chosen while no index exists and must never change afterwards.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use rand::RngCore;
use sha2::{Digest, Sha512};

use super::Notices;
use crate::config::{AppConfig, Prefs};

/// Random bytes mixed into each salt
const ENTROPY_BYTES: usize = 1024;

/// True only when a recipient key exists, no index has been built and no salt is configured
pub fn should_obfuscate_index(prefs: &Prefs, index_built: bool) -> bool {
    prefs.has_recipient() && !index_built && !prefs.has_index_salt()
}

/// SHA-512 over fresh random bytes, the recipient key id and the time, base64 encoded
pub fn generate_obfuscation_salt(
    rng: &mut dyn RngCore,
    recipient: &str,
    now: DateTime<Utc>,
) -> String {
    let mut entropy = vec![0u8; ENTROPY_BYTES];
    rng.fill_bytes(&mut entropy);

    let mut hasher = Sha512::new();
    hasher.update(&entropy);
    hasher.update(recipient.as_bytes());
    hasher.update(now.timestamp_micros().to_string().as_bytes());

    BASE64.encode(hasher.finalize())
}

/// Set the salt and the encrypted-index flag if [`should_obfuscate_index`] allows it.
///
/// Returns true when the index was obfuscated during this call.
pub fn maybe_obfuscate_index(
    config: &mut AppConfig,
    index_built: bool,
    rng: &mut dyn RngCore,
    now: DateTime<Utc>,
    notices: &mut Notices,
) -> bool {
    if !should_obfuscate_index(&config.prefs, index_built) {
        return false;
    }
    let Some(recipient) = config.prefs.gpg_recipient.clone() else {
        return false;
    };

    config.prefs.obfuscate_index = Some(generate_obfuscation_salt(rng, &recipient, now));
    config.prefs.index_encrypted = true;
    notices.notify("Obfuscating search index and enabling indexing of encrypted e-mail.");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn prefs_with_recipient() -> Prefs {
        Prefs {
            gpg_recipient: Some("AAAA1111BBBB2222".into()),
            ..Default::default()
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_predicate() {
        let prefs = prefs_with_recipient();
        assert!(should_obfuscate_index(&prefs, false));
        assert!(!should_obfuscate_index(&prefs, true));
        assert!(!should_obfuscate_index(&Prefs::default(), false));

        let salted = Prefs {
            obfuscate_index: Some("salt".into()),
            ..prefs_with_recipient()
        };
        assert!(!should_obfuscate_index(&salted, false));

        let blank_recipient = Prefs {
            gpg_recipient: Some(String::new()),
            ..Default::default()
        };
        assert!(!should_obfuscate_index(&blank_recipient, false));
    }

    #[test]
    fn test_salt_depends_on_entropy() {
        let a = generate_obfuscation_salt(&mut StdRng::seed_from_u64(1), "key", fixed_now());
        let b = generate_obfuscation_salt(&mut StdRng::seed_from_u64(2), "key", fixed_now());
        let a_again = generate_obfuscation_salt(&mut StdRng::seed_from_u64(1), "key", fixed_now());

        assert_ne!(a, b);
        assert_eq!(a, a_again);
        // 64-byte digest
        assert_eq!(BASE64.decode(&a).unwrap().len(), 64);
    }

    #[test]
    fn test_obfuscates_exactly_once() {
        let mut config = AppConfig {
            prefs: prefs_with_recipient(),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let mut notices = Notices::default();

        assert!(maybe_obfuscate_index(&mut config, false, &mut rng, fixed_now(), &mut notices));
        let salt = config.prefs.obfuscate_index.clone().unwrap();
        assert!(!salt.is_empty());
        assert!(config.prefs.index_encrypted);

        assert!(!maybe_obfuscate_index(&mut config, false, &mut rng, fixed_now(), &mut notices));
        assert_eq!(config.prefs.obfuscate_index, Some(salt));
    }

    #[test]
    fn test_built_index_blocks_obfuscation() {
        let mut config = AppConfig {
            prefs: prefs_with_recipient(),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(7);

        assert!(!maybe_obfuscate_index(
            &mut config,
            true,
            &mut rng,
            fixed_now(),
            &mut Notices::default()
        ));
        assert_eq!(config.prefs.obfuscate_index, None);
        assert!(!config.prefs.index_encrypted);
    }
}
