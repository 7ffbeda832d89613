//! Full setup against the on-disk stores

use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

use mail_setup::adapters::sqlite::{open_store, LocalMailbox, SearchIndex, SqliteTagStore};
use mail_setup::config::{ConfigStore, CryptoPolicy, TomlConfigStore};
use mail_setup::keyring::gnupg::parse_colon_listing;
use mail_setup::keyring::StaticKeyring;
use mail_setup::services::capabilities::{StaticProbe, KNOWN_PLUGINS, SPAM_PLUGIN};
use mail_setup::services::migrations::Migrations;
use mail_setup::tags::taxonomy::canonical_tags;
use mail_setup::tags::TagStore;
use mail_setup::{check_guard, run_setup, SetupEnvironment, SetupError, SetupReport};

const LISTING: &str = "\
sec:r:4096:1:REVOKED000000001:946684800:::u:::scESC:::+::::::0:
uid:u::::946684800::HASH0::Old Alice <alice@example.com>::::::::::0:
sec:u:255:22:AAAA1111BBBB2222:1577836800:::u:::scESC:::+:::ed25519:::0:
uid:u::::1577836800::HASH1::Alice Example <alice@example.com>::::::::::0:
sec:u:255:22:CCCC3333DDDD4444:1577836800:::u:::scESC:::+:::ed25519:::0:
uid:u::::1577836800::HASH2::Bob Example <bob@example.com>::::::::::0:
";

fn run(root: &Path, keyring: &StaticKeyring, spam: bool, seed: u64) -> mail_setup::Result<SetupReport> {
    let config = TomlConfigStore::new(root.join("config").join("config.toml"));
    check_guard(&config)?;
    let pool = open_store(&root.join("data").join("store.db"))?;
    let tags = SqliteTagStore::new(pool.clone());
    let mailbox = LocalMailbox::new(pool.clone(), root.join("data").join("mail"));
    let index = SearchIndex::new(pool);
    let migrations = Migrations::builtin();
    let probe = StaticProbe(spam);
    let mut rng = StdRng::seed_from_u64(seed);

    let env = SetupEnvironment {
        known_plugins: KNOWN_PLUGINS.iter().map(|p| p.to_string()).collect(),
        gnupg_home: Some(root.join("gnupg")),
        now: Utc::now(),
        today: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
    };

    let mut services = mail_setup::SetupServices {
        config: &config,
        tags: &tags,
        mailbox: &mailbox,
        index: &index,
        keyring,
        spam_probe: &probe,
        migrations: &migrations,
        rng: &mut rng,
    };
    run_setup(&mut services, &env)
}

#[test_log::test]
fn test_setup_twice_on_disk() {
    let root = tempfile::tempdir().unwrap();
    let keyring = StaticKeyring::new(parse_colon_listing(LISTING));

    let first = run(root.path(), &keyring, false, 1).unwrap();
    assert_eq!(first.created_tags.len(), canonical_tags().len());
    assert_eq!(
        first.accepted_keys,
        vec!["AAAA1111BBBB2222".to_string(), "CCCC3333DDDD4444".to_string()]
    );

    let store = TomlConfigStore::new(root.path().join("config").join("config.toml"));
    let after_first = store.load().unwrap();
    assert_eq!(after_first.prefs.gpg_recipient.as_deref(), Some("AAAA1111BBBB2222"));
    assert_eq!(after_first.prefs.crypto_policy, CryptoPolicy::SignOnly);
    assert_eq!(after_first.profiles.len(), 2);
    assert_eq!(after_first.profiles[0].name, "Alice Example");
    assert!(after_first.prefs.index_encrypted);
    // Classifier missing: no plugin, no rule, just a warning
    assert!(!after_first.has_plugin(SPAM_PLUGIN));
    assert!(after_first.prefs.autotag.is_empty());
    // No keyring home on disk
    assert!(after_first.prefs.vcard.importers.gpg.is_empty());

    let second = run(root.path(), &keyring, false, 2).unwrap();
    assert!(second.created_tags.is_empty());
    assert_eq!(store.load().unwrap(), after_first);

    let pool = open_store(&root.path().join("data").join("store.db")).unwrap();
    let tags = SqliteTagStore::new(pool).list_tags().unwrap();
    assert_eq!(tags.len(), canonical_tags().len());
}

#[test_log::test]
fn test_classifier_installed_later() {
    let root = tempfile::tempdir().unwrap();
    let keyring = StaticKeyring::unavailable();

    run(root.path(), &keyring, false, 1).unwrap();
    let report = run(root.path(), &keyring, true, 2).unwrap();
    assert!(report
        .notices
        .iter()
        .any(|n| n.message == "Enabling spambayes autotagger"));

    let config = TomlConfigStore::new(root.path().join("config").join("config.toml"))
        .load()
        .unwrap();
    assert!(config.has_plugin(SPAM_PLUGIN));
    assert_eq!(config.prefs.autotag.len(), 1);
}

#[test_log::test]
fn test_lockdown_on_disk() {
    let root = tempfile::tempdir().unwrap();
    let store = TomlConfigStore::new(root.path().join("config").join("config.toml"));
    let mut config = store.load().unwrap();
    config.sys.lockdown = true;
    store.save(&config).unwrap();

    let err = run(root.path(), &StaticKeyring::unavailable(), true, 1).unwrap_err();
    assert_eq!(err, SetupError::Lockdown);
    assert_eq!(store.load().unwrap(), config);
    assert!(!root.path().join("data").exists());
}
