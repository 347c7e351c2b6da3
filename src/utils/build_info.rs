//! What `version` prints: how the binary was built and where this home keeps
//! its ledgers.

use attend_domain::CURRENT_SCHEMA_VERSION;

use crate::config::AppSettings;

/// Values embedded by `build.rs`.
#[derive(Debug, Clone, Copy)]
pub struct BuildMetadata {
    pub version: &'static str,
    pub commit: &'static str,
    pub built_at: &'static str,
    pub target: &'static str,
    pub rustc: &'static str,
}

pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn current() -> BuildMetadata {
    BuildMetadata {
        version: CLI_VERSION,
        commit: option_env!("ATTENDANCE_CORE_COMMIT").unwrap_or("unknown"),
        built_at: option_env!("ATTENDANCE_CORE_BUILT_AT").unwrap_or("unknown"),
        target: option_env!("ATTENDANCE_CORE_TARGET").unwrap_or("unknown"),
        rustc: option_env!("ATTENDANCE_CORE_RUSTC").unwrap_or("unknown"),
    }
}

/// Label/value rows describing the build plus the ledger format and on-disk
/// layout `settings` points at.
pub fn version_rows(settings: &AppSettings) -> Vec<(&'static str, String)> {
    let meta = current();
    let paths = settings.storage_paths();
    vec![
        ("Commit", meta.commit.to_string()),
        ("Built", meta.built_at.to_string()),
        ("Target", meta.target.to_string()),
        ("Rustc", meta.rustc.to_string()),
        ("Ledger schema", format!("v{CURRENT_SCHEMA_VERSION}")),
        ("Config", settings.manager.config_path().display().to_string()),
        ("Ledgers", paths.ledger_root.display().to_string()),
        (
            "Backups",
            format!(
                "{} (keeps {})",
                paths.backup_root.display(),
                settings.config.backup_retention
            ),
        ),
        ("Empty subjects", settings.policy().to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn rows_describe_the_ledger_layout_of_this_home() {
        let dir = tempdir().unwrap();
        let settings = AppSettings::load_from(dir.path().to_path_buf()).unwrap();
        let rows = version_rows(&settings);
        let value = |label: &str| {
            rows.iter()
                .find(|(name, _)| *name == label)
                .map(|(_, value)| value.clone())
                .unwrap()
        };

        assert_eq!(value("Ledger schema"), format!("v{CURRENT_SCHEMA_VERSION}"));
        assert!(value("Ledgers").starts_with(&dir.path().join("data").display().to_string()));
        assert!(value("Backups").ends_with("(keeps 5)"));
        assert_eq!(value("Empty subjects"), "prune");
    }
}
