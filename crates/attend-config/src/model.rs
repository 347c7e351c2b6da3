use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Stores user-configurable tracker preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for ledgers and backups. Defaults to `<base>/data`.
    pub data_root: Option<PathBuf>,

    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,

    /// Drop a subject once edits or deletes bring its absence total to zero.
    #[serde(default = "Config::default_prune_empty_subjects")]
    pub prune_empty_subjects: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_student: Option<String>,

    #[serde(default = "Config::default_log_directive")]
    pub log_directive: String,

    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: None,
            backup_retention: Self::default_backup_retention(),
            prune_empty_subjects: Self::default_prune_empty_subjects(),
            default_student: None,
            log_directive: Self::default_log_directive(),
            ui_color_enabled: Self::default_ui_color_enabled(),
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 6] = [
        "data_root",
        "backup_retention",
        "prune_empty_subjects",
        "default_student",
        "log_directive",
        "ui_color_enabled",
    ];

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn default_prune_empty_subjects() -> bool {
        true
    }

    pub fn default_log_directive() -> String {
        "attendance_core=info".into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    /// Directory holding ledger files and backups.
    pub fn resolve_data_root(&self, base: &Path) -> PathBuf {
        self.data_root
            .clone()
            .unwrap_or_else(|| base.join("data"))
    }

    /// Renders a single setting for display; `None` for unknown keys.
    pub fn get_value(&self, key: &str) -> Option<String> {
        let value = match key {
            "data_root" => self
                .data_root
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "(default)".into()),
            "backup_retention" => self.backup_retention.to_string(),
            "prune_empty_subjects" => self.prune_empty_subjects.to_string(),
            "default_student" => self
                .default_student
                .clone()
                .unwrap_or_else(|| "(none)".into()),
            "log_directive" => self.log_directive.clone(),
            "ui_color_enabled" => self.ui_color_enabled.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Parses and assigns a setting from its textual form.
    pub fn set_value(&mut self, key: &str, raw: &str) -> Result<(), ConfigError> {
        let value = raw.trim();
        match key {
            "data_root" => {
                self.data_root = optional(value).map(PathBuf::from);
            }
            "backup_retention" => {
                let parsed: usize = value.parse().map_err(|_| invalid(key, "expected a whole number"))?;
                if parsed == 0 {
                    return Err(invalid(key, "must keep at least one backup"));
                }
                self.backup_retention = parsed;
            }
            "prune_empty_subjects" => self.prune_empty_subjects = parse_bool(key, value)?,
            "default_student" => self.default_student = optional(value).map(str::to_string),
            "log_directive" => {
                if value.is_empty() {
                    return Err(invalid(key, "cannot be empty"));
                }
                self.log_directive = value.to_string();
            }
            "ui_color_enabled" => self.ui_color_enabled = parse_bool(key, value)?,
            _ => return Err(invalid(key, "unknown setting")),
        }
        Ok(())
    }
}

fn optional(value: &str) -> Option<&str> {
    match value {
        "" | "-" | "none" | "default" => None,
        other => Some(other),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(key, "expected true or false")),
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}
