//! GnuPG keyring client
//!
//! Shells out to `gpg` and parses its machine-readable colon listing.
//! Record layout (1-based fields): 1 type, 2 validity, 5 key id,
//! 6 creation date, 7 expiration date, 10 user id, 12 capabilities.

use chrono::{DateTime, NaiveDate};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

use super::{CryptoIdentity, KeyCapabilities, Keyring, UserIdentity};
use crate::types::error::{Result, SetupError};

const DEFAULT_PROGRAM: &str = "gpg";

/// GnuPG home: `$GNUPGHOME`, else `~/.gnupg`
pub fn default_gnupg_home() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("GNUPGHOME") {
        return Some(PathBuf::from(home));
    }
    dirs::home_dir().map(|home| home.join(".gnupg"))
}

pub struct GnuPg {
    program: String,
    homedir: Option<PathBuf>,
}

impl GnuPg {
    pub fn new() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            homedir: None,
        }
    }

    /// Use a different executable name or path
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    /// Pass `--homedir` to every invocation
    pub fn with_homedir(mut self, homedir: &Path) -> Self {
        self.homedir = Some(homedir.to_path_buf());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--batch");
        if let Some(homedir) = &self.homedir {
            cmd.arg("--homedir").arg(homedir);
        }
        cmd
    }
}

impl Default for GnuPg {
    fn default() -> Self {
        Self::new()
    }
}

impl Keyring for GnuPg {
    fn is_available(&self) -> bool {
        if let Err(e) = which::which(&self.program) {
            debug!("{} not found on PATH: {}", self.program, e);
            return false;
        }

        match self.command().arg("--version").output() {
            Ok(output) => output.status.success(),
            Err(e) => {
                warn!("Failed to run {} --version: {}", self.program, e);
                false
            }
        }
    }

    fn list_secret_identities(&self) -> Result<Vec<CryptoIdentity>> {
        let output = self
            .command()
            .args(["--with-colons", "--fixed-list-mode", "--list-secret-keys"])
            .output()
            .map_err(|e| SetupError::Keyring(format!("Failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(SetupError::Keyring(format!(
                "{} --list-secret-keys failed: {}",
                self.program,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let identities = parse_colon_listing(&String::from_utf8_lossy(&output.stdout));
        info!("Found {} secret keys", identities.len());
        Ok(identities)
    }
}

/// Key being assembled while walking the listing
struct PendingKey {
    identity: CryptoIdentity,
    validity: String,
    created: Option<String>,
    expires: Option<String>,
}

impl PendingKey {
    fn finish(mut self) -> CryptoIdentity {
        // Without an explicit revocation record, expiry and a revoked
        // validity flag are both reported through revocation_date.
        if self.identity.revocation_date.is_none() {
            self.identity.revocation_date = match self.validity.as_str() {
                "r" => self.created.or(self.expires),
                _ => self.expires,
            };
        }
        self.identity
    }
}

/// Parse `gpg --with-colons --list-secret-keys` output
pub fn parse_colon_listing(listing: &str) -> Vec<CryptoIdentity> {
    let mut keys = Vec::new();
    let mut current: Option<PendingKey> = None;

    for line in listing.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        let field = |i: usize| fields.get(i).copied().unwrap_or("");

        match field(0) {
            "sec" => {
                if let Some(done) = current.take() {
                    keys.push(done.finish());
                }
                current = Some(PendingKey {
                    identity: CryptoIdentity {
                        key_id: field(4).to_string(),
                        revocation_date: None,
                        capabilities: KeyCapabilities::from_flags(field(11)),
                        user_identities: Vec::new(),
                    },
                    validity: field(1).to_string(),
                    created: format_colon_date(field(5)),
                    expires: format_colon_date(field(6)),
                });
            }
            "ssb" => {
                if let Some(key) = current.as_mut() {
                    // Subkeys only contribute usable capabilities
                    if field(1) != "r" && field(1) != "e" {
                        key.identity.capabilities.merge_flags(field(11));
                    }
                }
            }
            "uid" => {
                if let Some(key) = current.as_mut() {
                    if field(1) == "r" {
                        continue;
                    }
                    let uid = parse_user_id(&unescape_field(field(9)));
                    key.identity.user_identities.push(uid);
                }
            }
            "rev" => {
                if let Some(key) = current.as_mut() {
                    if let Some(date) = format_colon_date(field(5)) {
                        key.identity.revocation_date = Some(date);
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(done) = current.take() {
        keys.push(done.finish());
    }
    keys
}

/// Render a colon-listing timestamp (epoch seconds or `YYYYMMDDThhmmss`) as `YYYY-MM-DD`
fn format_colon_date(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }

    if value.bytes().all(|b| b.is_ascii_digit()) {
        let secs: i64 = value.parse().ok()?;
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.format("%Y-%m-%d").to_string());
    }

    let date = value.get(..8)?;
    NaiveDate::parse_from_str(date, "%Y%m%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Decode the `\xNN` escapes gpg uses inside colon fields
fn unescape_field(value: &str) -> String {
    let mut bytes = Vec::with_capacity(value.len());
    let raw = value.as_bytes();
    let mut i = 0;

    while i < raw.len() {
        if raw[i] == b'\\' && raw.get(i + 1) == Some(&b'x') && i + 3 < raw.len() {
            let hex = std::str::from_utf8(&raw[i + 2..i + 4]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                bytes.push(byte);
                i += 4;
                continue;
            }
        }
        bytes.push(raw[i]);
        i += 1;
    }

    String::from_utf8_lossy(&bytes).to_string()
}

/// Split `Name (comment) <email>` into name and email
fn parse_user_id(uid: &str) -> UserIdentity {
    let uid = uid.trim();

    if let (Some(start), true) = (uid.rfind('<'), uid.ends_with('>')) {
        let email = uid[start + 1..uid.len() - 1].trim().to_string();
        let mut name = uid[..start].trim();
        if name.ends_with(')') {
            if let Some(open) = name.rfind('(') {
                name = name[..open].trim();
            }
        }
        return UserIdentity {
            name: name.to_string(),
            email,
        };
    }

    if uid.contains('@') && !uid.contains(' ') {
        return UserIdentity {
            name: String::new(),
            email: uid.to_string(),
        };
    }

    UserIdentity {
        name: uid.to_string(),
        email: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
sec:u:255:22:AAAA1111BBBB2222:1577836800:::u:::scESC:::+:::ed25519:::0:
fpr:::::::::0123456789ABCDEF0123AAAA1111BBBB2222:
grp:::::::::00112233445566778899AABBCCDDEEFF00112233:
uid:u::::1577836800::HASH1::Alice Example (work) <alice@example.com>::::::::::0:
uid:u::::1577836800::HASH2::Alice Q\\x3a Example <alice@home.example>::::::::::0:
ssb:u:255:18:CCCC3333DDDD4444:1577836800::::::e:::+:::cv25519::
sec:e:4096:1:EEEE5555FFFF6666:946684800:978307200::u:::scSC:::+::::::0:
uid:e::::946684800::HASH3::Old Key <old@example.com>::::::::::0:
sec:r:4096:1:1111222233334444:946684800:::u:::sc:::+::::::0:
uid:r::::946684800::HASH4::Revoked <revoked@example.com>::::::::::0:
";

    #[test]
    fn test_parse_listing() {
        let keys = parse_colon_listing(LISTING);
        assert_eq!(keys.len(), 3);

        let alice = &keys[0];
        assert_eq!(alice.key_id, "AAAA1111BBBB2222");
        assert!(alice.capabilities.encrypt);
        assert_eq!(alice.revocation_date, None);
        assert_eq!(alice.user_identities.len(), 2);
        assert_eq!(alice.user_identities[0].name, "Alice Example");
        assert_eq!(alice.user_identities[0].email, "alice@example.com");
        assert_eq!(alice.user_identities[1].name, "Alice Q: Example");
    }

    #[test]
    fn test_expired_key_reports_expiry_as_revocation() {
        let keys = parse_colon_listing(LISTING);
        let old = &keys[1];
        assert_eq!(old.revocation_date.as_deref(), Some("2001-01-01"));
        assert!(!old.capabilities.encrypt);
        assert!(old.is_revoked_on("2026-10-19"));
    }

    #[test]
    fn test_revoked_key_without_rev_record() {
        let keys = parse_colon_listing(LISTING);
        let revoked = &keys[2];
        assert_eq!(revoked.revocation_date.as_deref(), Some("2000-01-01"));
        // Revoked user ids are dropped
        assert!(revoked.user_identities.is_empty());
    }

    #[test]
    fn test_rev_record_sets_date() {
        let listing = "\
sec:u:255:22:9999888877776666:1577836800:::u:::scESC:::+:::ed25519:::0:
rev:::1:9999888877776666:1609459200::::::20x:
uid:u::::1577836800::HASH::Bob <bob@example.com>::::::::::0:
";
        let keys = parse_colon_listing(listing);
        assert_eq!(keys[0].revocation_date.as_deref(), Some("2021-01-01"));
    }

    #[test]
    fn test_parse_user_id_shapes() {
        assert_eq!(
            parse_user_id("carol@example.com"),
            UserIdentity {
                name: String::new(),
                email: "carol@example.com".into()
            }
        );
        assert_eq!(parse_user_id("Just A Name").email, "");
        assert_eq!(parse_user_id("Dave <dave@example.com>").name, "Dave");
    }

    #[test]
    fn test_iso_timestamp() {
        assert_eq!(format_colon_date("20240315T120000").as_deref(), Some("2024-03-15"));
        assert_eq!(format_colon_date(""), None);
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let gpg = GnuPg::new().with_program("definitely-not-a-real-gpg-binary");
        assert!(!gpg.is_available());
    }
}
