//! Configuration migrations run around the main setup body
//!
//! Each migration runs at most once per install; its name is recorded in
//! `sys.migrations` after it succeeds.

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::types::error::{Result, SetupError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationPhase {
    BeforeSetup,
    AfterSetup,
}

pub struct Migration {
    pub name: &'static str,
    pub phase: MigrationPhase,
    pub apply: fn(&mut AppConfig) -> Result<()>,
}

pub trait MigrationRunner {
    /// Run pending migrations of the selected phases.
    ///
    /// The name of each migration is pushed onto `applied` as soon as it
    /// succeeds, so a later failure still leaves the earlier names there.
    fn run(
        &self,
        config: &mut AppConfig,
        before_setup: bool,
        after_setup: bool,
        applied: &mut Vec<String>,
    ) -> Result<()>;
}

/// Runs a fixed list of migrations in order
pub struct Migrations {
    migrations: Vec<Migration>,
}

impl Migrations {
    pub fn new(migrations: Vec<Migration>) -> Self {
        Self { migrations }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            Migration {
                name: "dedupe-plugins",
                phase: MigrationPhase::BeforeSetup,
                apply: dedupe_plugins,
            },
            Migration {
                name: "index-flag-requires-salt",
                phase: MigrationPhase::AfterSetup,
                apply: index_flag_requires_salt,
            },
        ])
    }
}

impl Default for Migrations {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MigrationRunner for Migrations {
    fn run(
        &self,
        config: &mut AppConfig,
        before_setup: bool,
        after_setup: bool,
        applied: &mut Vec<String>,
    ) -> Result<()> {
        let start = applied.len();

        for migration in &self.migrations {
            let selected = match migration.phase {
                MigrationPhase::BeforeSetup => before_setup,
                MigrationPhase::AfterSetup => after_setup,
            };
            if !selected || config.sys.migrations.iter().any(|m| m == migration.name) {
                continue;
            }

            (migration.apply)(config).map_err(|e| {
                SetupError::Migration(format!("{} failed: {}", migration.name, e))
            })?;
            config.sys.migrations.push(migration.name.to_string());
            info!("Applied migration {}", migration.name);
            applied.push(migration.name.to_string());
        }

        debug!(before_setup, after_setup, count = applied.len() - start, "Migrations finished");
        Ok(())
    }
}

/// Collapse repeated plugin names, keeping the first occurrence
fn dedupe_plugins(config: &mut AppConfig) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    config.sys.plugins.retain(|p| seen.insert(p.clone()));
    Ok(())
}

/// An encrypted index without a salt cannot be read back; clear the flag
fn index_flag_requires_salt(config: &mut AppConfig) -> Result<()> {
    let prefs = &mut config.prefs;
    if prefs.index_encrypted && !prefs.has_index_salt() {
        prefs.index_encrypted = false;
    }
    Ok(())
}
