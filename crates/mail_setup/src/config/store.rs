use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

use super::AppConfig;
use crate::types::error::{Result, SetupError};

/// Durable home of the [`AppConfig`]
///
/// `save` followed by `load` is the commit-and-reload step at the end of setup.
pub trait ConfigStore {
    fn load(&self) -> Result<AppConfig>;
    fn save(&self, config: &AppConfig) -> Result<()>;
}

/// TOML file on disk
pub struct TomlConfigStore {
    path: PathBuf,
}

impl TomlConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            info!("No config file at {:?}, using empty config", self.path);
            return Ok(AppConfig::default());
        }

        debug!("Loading configuration from: {:?}", self.path);
        let content = fs::read_to_string(&self.path)
            .map_err(|e| SetupError::Config(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| SetupError::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    fn save(&self, config: &AppConfig) -> Result<()> {
        let content = toml::to_string_pretty(config)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Replace atomically so a crash never leaves a truncated config
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;

        info!("Saved configuration to {:?}", self.path);
        Ok(())
    }
}

/// In-process store, for tests and for hosts that persist elsewhere
#[derive(Default)]
pub struct MemoryConfigStore {
    config: RwLock<AppConfig>,
    saves: RwLock<usize>,
}

impl MemoryConfigStore {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: RwLock::new(config),
            saves: RwLock::new(0),
        }
    }

    /// Snapshot of the last saved (or initial) config
    pub fn snapshot(&self) -> AppConfig {
        self.config.read().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of times `save` was called
    pub fn save_count(&self) -> usize {
        self.saves.read().map(|n| *n).unwrap_or(0)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<AppConfig> {
        self.config
            .read()
            .map(|c| c.clone())
            .map_err(|e| SetupError::Config(format!("Failed to lock config: {}", e)))
    }

    fn save(&self, config: &AppConfig) -> Result<()> {
        let mut guard = self
            .config
            .write()
            .map_err(|e| SetupError::Config(format!("Failed to lock config: {}", e)))?;
        *guard = config.clone();

        if let Ok(mut saves) = self.saves.write() {
            *saves += 1;
        }
        Ok(())
    }
}
