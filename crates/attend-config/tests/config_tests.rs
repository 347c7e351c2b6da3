use std::fs;

use attend_config::{Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_prunes_and_keeps_backups() {
    let cfg = Config::default();

    assert!(cfg.prune_empty_subjects);
    assert_eq!(cfg.backup_retention, 5);
    assert!(!cfg.log_directive.is_empty());
    assert!(cfg.default_student.is_none());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let mut cfg = Config::default();
    cfg.set_value("default_student", "2021CS042").unwrap();
    cfg.set_value("prune_empty_subjects", "off").unwrap();

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert_eq!(loaded.default_student.as_deref(), Some("2021CS042"));
    assert!(!loaded.prune_empty_subjects);
}

#[test]
fn missing_config_file_yields_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));
    assert_eq!(manager.load().unwrap(), Config::default());
}

#[test]
fn partial_config_file_fills_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "default_student": "s-9" }"#).unwrap();

    let loaded = ConfigManager::new(path).load().unwrap();
    assert_eq!(loaded.default_student.as_deref(), Some("s-9"));
    assert!(loaded.prune_empty_subjects);
    assert_eq!(loaded.backup_retention, 5);
}

#[test]
fn set_value_rejects_bad_input() {
    let mut cfg = Config::default();
    for (key, value) in [
        ("backup_retention", "0"),
        ("backup_retention", "many"),
        ("prune_empty_subjects", "maybe"),
        ("log_directive", " "),
        ("colour", "on"),
    ] {
        let err = cfg.set_value(key, value).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }), "{key}={value}");
    }
    assert_eq!(cfg, Config::default());
}

#[test]
fn every_key_is_readable() {
    let cfg = Config::default();
    for key in Config::KEYS {
        assert!(cfg.get_value(key).is_some(), "{key}");
    }
    assert!(cfg.get_value("unknown").is_none());
}
