//! Path resolution and configuration wiring for the application home.

use std::path::{Path, PathBuf};

pub use attend_config::{Config, ConfigError, ConfigManager, HOME_ENV};
use attend_domain::EmptySubjectPolicy;
use attend_storage_json::{JsonLedgerStorage, StoragePaths};

use crate::errors::AttendanceResult;

/// Resolves on-disk locations under the application base directory.
pub struct PathResolver;

impl PathResolver {
    /// `ATTENDANCE_CORE_HOME` when set, otherwise `~/.attendance_core`.
    pub fn base_dir() -> PathBuf {
        attend_config::default_base_dir()
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join("config").join("config.json")
    }

    pub fn storage_paths_in(base: &Path, config: &Config) -> StoragePaths {
        StoragePaths::under(&config.resolve_data_root(base))
    }
}

/// Configuration loaded for one application home.
pub struct AppSettings {
    pub base: PathBuf,
    pub manager: ConfigManager,
    pub config: Config,
}

impl AppSettings {
    /// Loads settings from the default base directory.
    pub fn load_default() -> AttendanceResult<Self> {
        Self::load_from(PathResolver::base_dir())
    }

    pub fn load_from(base: PathBuf) -> AttendanceResult<Self> {
        let manager = ConfigManager::with_base_dir(base.clone())?;
        let config = manager.load()?;
        Ok(Self {
            base,
            manager,
            config,
        })
    }

    pub fn policy(&self) -> EmptySubjectPolicy {
        EmptySubjectPolicy::from_prune_flag(self.config.prune_empty_subjects)
    }

    pub fn storage_paths(&self) -> StoragePaths {
        PathResolver::storage_paths_in(&self.base, &self.config)
    }

    /// Opens the JSON adapter at the configured data root.
    pub fn open_storage(&self) -> AttendanceResult<JsonLedgerStorage> {
        let storage =
            JsonLedgerStorage::with_retention(self.storage_paths(), self.config.backup_retention)?;
        Ok(storage)
    }

    pub fn save(&self) -> AttendanceResult<()> {
        self.manager.save(&self.config)?;
        Ok(())
    }
}
