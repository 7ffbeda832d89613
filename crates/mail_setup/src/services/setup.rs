//! First-run setup orchestrator
//!
//! Stages run in a fixed order:
//!
//! GuardCheck → PreMigration → EnsureMailbox → ReconcileTags →
//! ActivateCapabilities → DiscoverIdentities → MaybeObfuscate →
//! PostMigration → Persist
//!
//! Only the lockdown guard and config load/persist failures end the run
//! early. Any other stage failure becomes a warning notice and the next
//! stage runs anyway. Running setup again on an unchanged system leaves
//! tags and config exactly as they were.

use chrono::{DateTime, Local, NaiveDate, Utc};
use rand::RngCore;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::capabilities::{activate_capabilities, CapabilityReport, SubsystemProbe, KNOWN_PLUGINS};
use super::identity_discovery::discover_identities;
use super::index_obfuscation::maybe_obfuscate_index;
use super::migrations::MigrationRunner;
use super::{Notice, Notices};
use crate::config::{AppConfig, ConfigStore};
use crate::keyring::gnupg::default_gnupg_home;
use crate::keyring::Keyring;
use crate::storage::{IndexProbe, MailboxInitializer};
use crate::tags::taxonomy::NEW_TAG;
use crate::tags::{reconcile_tags, TagStore};
use crate::types::error::{Result, SetupError};

pub const SUCCESS_MESSAGE: &str = "Performed initial setup";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStage {
    GuardCheck,
    PreMigration,
    EnsureMailbox,
    ReconcileTags,
    ActivateCapabilities,
    DiscoverIdentities,
    MaybeObfuscate,
    PostMigration,
    Persist,
}

impl fmt::Display for SetupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GuardCheck => "guard-check",
            Self::PreMigration => "pre-migration",
            Self::EnsureMailbox => "ensure-mailbox",
            Self::ReconcileTags => "reconcile-tags",
            Self::ActivateCapabilities => "activate-capabilities",
            Self::DiscoverIdentities => "discover-identities",
            Self::MaybeObfuscate => "maybe-obfuscate",
            Self::PostMigration => "post-migration",
            Self::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// Collaborators the setup procedure drives
pub struct SetupServices<'a> {
    pub config: &'a dyn ConfigStore,
    pub tags: &'a dyn TagStore,
    pub mailbox: &'a dyn MailboxInitializer,
    pub index: &'a dyn IndexProbe,
    pub keyring: &'a dyn Keyring,
    pub spam_probe: &'a dyn SubsystemProbe,
    pub migrations: &'a dyn MigrationRunner,
    pub rng: &'a mut dyn RngCore,
}

/// Facts about the host taken at the start of the run
#[derive(Debug, Clone)]
pub struct SetupEnvironment {
    pub known_plugins: Vec<String>,
    pub gnupg_home: Option<PathBuf>,
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
}

impl SetupEnvironment {
    pub fn from_system() -> Self {
        Self {
            known_plugins: KNOWN_PLUGINS.iter().map(|p| p.to_string()).collect(),
            gnupg_home: default_gnupg_home(),
            now: Utc::now(),
            today: Local::now().date_naive(),
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct SetupReport {
    pub message: String,
    pub created_tags: Vec<String>,
    pub capabilities: CapabilityReport,
    /// False when the keyring was missing or could not be listed
    pub keyring_available: bool,
    pub accepted_keys: Vec<String>,
    pub added_profiles: Vec<String>,
    /// Recipient key chosen during this run, if any
    pub recipient_set: Option<String>,
    pub applied_migrations: Vec<String>,
    pub index_obfuscated: bool,
    pub notices: Vec<Notice>,
}

fn enter(stage: SetupStage) {
    debug!(stage = %stage, "Entering setup stage");
}

/// Load the config and refuse to go further if lockdown is active.
///
/// Callers that create on-disk state while wiring up collaborators should
/// call this first.
pub fn check_guard(store: &dyn ConfigStore) -> Result<AppConfig> {
    let config = store.load()?;
    if config.sys.lockdown {
        warn!("Setup refused: lockdown is active");
        return Err(SetupError::Lockdown);
    }
    Ok(config)
}

/// Bring configuration and tags to their baseline state
pub fn run_setup(services: &mut SetupServices<'_>, env: &SetupEnvironment) -> Result<SetupReport> {
    enter(SetupStage::GuardCheck);
    let mut config = check_guard(services.config)?;

    let mut notices = Notices::default();
    let mut applied_migrations = Vec::new();

    enter(SetupStage::PreMigration);
    run_migrations(services.migrations, &mut config, true, &mut applied_migrations, &mut notices);

    enter(SetupStage::EnsureMailbox);
    match services.mailbox.open_local_mailbox() {
        Ok(mailbox) => {
            if config.sys.local_mailbox.is_none() {
                config.sys.local_mailbox = Some(mailbox.path);
            }
        }
        Err(e) => notices.warning(format!("Could not create local mailbox: {}", e)),
    }

    enter(SetupStage::ReconcileTags);
    let tag_report = reconcile_tags(services.tags);
    if tag_report.was_created(NEW_TAG) {
        notices.notify("Created default tags");
    }
    for (key, reason) in &tag_report.failures {
        notices.warning(format!("Could not set up tag {}: {}", key, reason));
    }

    enter(SetupStage::ActivateCapabilities);
    let capabilities = activate_capabilities(
        &mut config,
        &env.known_plugins,
        services.spam_probe,
        env.gnupg_home.as_deref(),
        &mut notices,
    );

    enter(SetupStage::DiscoverIdentities);
    let today = env.today.format("%Y-%m-%d").to_string();
    let discovery = discover_identities(&mut config, services.keyring, &today, &mut notices);

    enter(SetupStage::MaybeObfuscate);
    let index_built = services.index.has_built_index().unwrap_or_else(|e| {
        // Unknown index state: leave the salt alone rather than risk orphaning an index
        notices.warning(format!("Could not check search index state: {}", e));
        true
    });
    let index_obfuscated =
        maybe_obfuscate_index(&mut config, index_built, &mut *services.rng, env.now, &mut notices);

    enter(SetupStage::PostMigration);
    run_migrations(services.migrations, &mut config, false, &mut applied_migrations, &mut notices);

    enter(SetupStage::Persist);
    services.config.save(&config)?;
    let reloaded = services.config.load()?;
    if reloaded != config {
        return Err(SetupError::Config(
            "Saved configuration did not read back identically".to_string(),
        ));
    }

    info!(
        created_tags = tag_report.created.len(),
        accepted_keys = discovery.accepted_keys.len(),
        index_obfuscated,
        "{}",
        SUCCESS_MESSAGE
    );

    Ok(SetupReport {
        message: SUCCESS_MESSAGE.to_string(),
        created_tags: tag_report.created,
        capabilities,
        keyring_available: discovery.keyring_available,
        accepted_keys: discovery.accepted_keys,
        added_profiles: discovery.added_profiles,
        recipient_set: discovery.recipient_set,
        applied_migrations,
        index_obfuscated,
        notices: notices.into_vec(),
    })
}

fn run_migrations(
    runner: &dyn MigrationRunner,
    config: &mut AppConfig,
    before_setup: bool,
    applied: &mut Vec<String>,
    notices: &mut Notices,
) {
    if let Err(e) = runner.run(config, before_setup, !before_setup, applied) {
        notices.warning(format!("Migration failed: {}", e));
    }
}
