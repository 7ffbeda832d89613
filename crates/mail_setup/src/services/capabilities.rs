//! Optional subsystem activation
//!
//! Everything here is additive: plugins are set-unioned into the active
//! list, importers are only added to empty lists, and a missing optional
//! subsystem is a warning rather than an error.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::Notices;
use crate::config::{ensure_present, AppConfig, AutotagRule, GpgImporter, GravatarImporter};

/// Optional modules the host ships with
pub const KNOWN_PLUGINS: &[&str] = &[
    "search",
    "tags",
    "contacts",
    "compose",
    "groups",
    "dates",
    "sizes",
    "autotag",
    "cryptostate",
    "setup",
    "exporters",
    "vcard_carddav",
    "vcard_gnupg",
    "vcard_gravatar",
    "html_magic",
    "migrate",
];

/// Plugin backing the spam classifier
pub const SPAM_PLUGIN: &str = "autotag_sb";

/// Executable the spam classifier needs
pub const SPAM_CLASSIFIER_PROGRAM: &str = "sb_filter.py";

const SPAM_TAGGER: &str = "spambayes";

/// Runtime availability check for an optional subsystem
pub trait SubsystemProbe {
    fn is_available(&self) -> bool;
}

/// Available when `program` is on `PATH`
pub struct CommandProbe {
    program: String,
}

impl CommandProbe {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl SubsystemProbe for CommandProbe {
    fn is_available(&self) -> bool {
        match which::which(&self.program) {
            Ok(path) => {
                debug!("Found {} at {:?}", self.program, path);
                true
            }
            Err(_) => false,
        }
    }
}

/// Probe with a fixed answer
pub struct StaticProbe(pub bool);

impl SubsystemProbe for StaticProbe {
    fn is_available(&self) -> bool {
        self.0
    }
}

/// What the capability stage changed
#[derive(Debug, Default, Clone, Serialize)]
pub struct CapabilityReport {
    pub registered_plugins: Vec<String>,
    pub spam_classifier_activated: bool,
    pub gravatar_enabled: bool,
    pub gpg_importer_enabled: bool,
    pub autotag_rule_created: bool,
}

/// Add every known plugin missing from the active list
pub fn register_plugins(config: &mut AppConfig, known: &[String]) -> Vec<String> {
    let mut added = Vec::new();
    for plugin in known {
        if !config.has_plugin(plugin) {
            config.sys.plugins.push(plugin.clone());
            added.push(plugin.clone());
        }
    }
    added
}

/// Activate the spam classifier if it can run. Returns true if activated now.
pub fn activate_spam_classifier(
    config: &mut AppConfig,
    probe: &dyn SubsystemProbe,
    notices: &mut Notices,
) -> bool {
    if !probe.is_available() {
        notices.warning("Please install spambayes for super awesome spam filtering");
        return false;
    }

    if config.has_plugin(SPAM_PLUGIN) {
        return false;
    }

    config.sys.plugins.push(SPAM_PLUGIN.to_string());
    notices.notify("Enabling spambayes autotagger");
    true
}

/// Enable the avatar importer, and the keyring contact importer when a keyring home exists
pub fn enable_importers(
    config: &mut AppConfig,
    gnupg_home: Option<&Path>,
    notices: &mut Notices,
    report: &mut CapabilityReport,
) {
    let importers = &mut config.prefs.vcard.importers;

    if ensure_present(&mut importers.gravatar, || GravatarImporter { active: true }) {
        notices.notify("Enabling gravatar image importer");
        report.gravatar_enabled = true;
    }

    let Some(home) = gnupg_home.filter(|home| home.is_dir()) else {
        return;
    };

    let gpg_home: PathBuf = home.to_path_buf();
    if ensure_present(&mut importers.gpg, || GpgImporter {
        active: true,
        gpg_home,
    }) {
        notices.notify("Importing contacts from GPG keyring");
        report.gpg_importer_enabled = true;
    }
}

/// The rule binding the spam classifier to the Spam/MaybeSpam/Ham tags
pub fn default_spam_rule() -> AutotagRule {
    AutotagRule {
        match_tag: "spam".to_string(),
        unsure_tag: "maybespam".to_string(),
        tagger: SPAM_TAGGER.to_string(),
        trainer: SPAM_TAGGER.to_string(),
        exclude_tags: vec!["ham".to_string()],
    }
}

/// Add the default spam rule if the classifier is active and no rule exists yet
pub fn ensure_spam_autotag(config: &mut AppConfig) -> bool {
    if !config.has_plugin(SPAM_PLUGIN) {
        return false;
    }
    ensure_present(&mut config.prefs.autotag, default_spam_rule)
}

/// Run every capability probe in order
pub fn activate_capabilities(
    config: &mut AppConfig,
    known_plugins: &[String],
    spam_probe: &dyn SubsystemProbe,
    gnupg_home: Option<&Path>,
    notices: &mut Notices,
) -> CapabilityReport {
    let mut report = CapabilityReport {
        registered_plugins: register_plugins(config, known_plugins),
        ..Default::default()
    };

    report.spam_classifier_activated = activate_spam_classifier(config, spam_probe, notices);
    enable_importers(config, gnupg_home, notices, &mut report);
    report.autotag_rule_created = ensure_spam_autotag(config);

    debug!(
        registered = report.registered_plugins.len(),
        autotag = report.autotag_rule_created,
        "Capability probes finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> Vec<String> {
        KNOWN_PLUGINS.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_register_plugins_is_a_set_union() {
        let mut config = AppConfig::default();
        config.sys.plugins = vec!["tags".into(), "custom".into()];

        let added = register_plugins(&mut config, &known());
        assert_eq!(added.len(), KNOWN_PLUGINS.len() - 1);
        assert_eq!(config.sys.plugins[..2], ["tags".to_string(), "custom".to_string()]);

        assert!(register_plugins(&mut config, &known()).is_empty());
        assert_eq!(config.sys.plugins.len(), KNOWN_PLUGINS.len() + 1);
    }

    #[test]
    fn test_spam_classifier_unavailable_is_a_warning() {
        let mut config = AppConfig::default();
        let mut notices = Notices::default();

        assert!(!activate_spam_classifier(&mut config, &StaticProbe(false), &mut notices));
        assert!(!config.has_plugin(SPAM_PLUGIN));
        assert_eq!(notices.warnings().count(), 1);
    }

    #[test]
    fn test_spam_classifier_activates_once() {
        let mut config = AppConfig::default();
        let mut notices = Notices::default();

        assert!(activate_spam_classifier(&mut config, &StaticProbe(true), &mut notices));
        assert!(!activate_spam_classifier(&mut config, &StaticProbe(true), &mut notices));
        assert_eq!(config.sys.plugins, vec![SPAM_PLUGIN.to_string()]);
        assert!(notices.contains("Enabling spambayes autotagger"));
    }

    #[test]
    fn test_gpg_importer_needs_keyring_home() {
        let mut config = AppConfig::default();
        let mut notices = Notices::default();
        let mut report = CapabilityReport::default();
        let missing = PathBuf::from("/nonexistent/.gnupg");

        enable_importers(&mut config, Some(missing.as_path()), &mut notices, &mut report);
        assert_eq!(config.prefs.vcard.importers.gravatar.len(), 1);
        assert!(config.prefs.vcard.importers.gpg.is_empty());
        assert!(report.gravatar_enabled && !report.gpg_importer_enabled);
    }

    #[test]
    fn test_importers_only_added_to_empty_lists() {
        let home = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.prefs.vcard.importers.gravatar.push(GravatarImporter { active: false });
        let mut notices = Notices::default();
        let mut report = CapabilityReport::default();

        enable_importers(&mut config, Some(home.path()), &mut notices, &mut report);
        enable_importers(&mut config, Some(home.path()), &mut notices, &mut report);

        let importers = &config.prefs.vcard.importers;
        assert_eq!(importers.gravatar, vec![GravatarImporter { active: false }]);
        assert_eq!(importers.gpg.len(), 1);
        assert_eq!(importers.gpg[0].gpg_home, home.path());
    }

    #[test]
    fn test_default_spam_rule() {
        let mut config = AppConfig::default();
        assert!(!ensure_spam_autotag(&mut config));

        config.sys.plugins.push(SPAM_PLUGIN.into());
        assert!(ensure_spam_autotag(&mut config));
        assert!(!ensure_spam_autotag(&mut config));

        let rule = &config.prefs.autotag[0];
        assert_eq!(config.prefs.autotag.len(), 1);
        assert_eq!(rule.match_tag, "spam");
        assert_eq!(rule.unsure_tag, "maybespam");
        assert_eq!(rule.exclude_tags, vec!["ham".to_string()]);
    }
}
