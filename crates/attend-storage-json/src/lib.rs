//! attend-storage-json
//!
//! Filesystem-backed [`LedgerStorage`] that keeps one pretty-printed JSON
//! file per student, with rotating backups and whole-store snapshot files.

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use attend_core::{parse_snapshot, CoreError, LedgerStorage};
use attend_domain::{Ledger, StoreSnapshot};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, warn};

const LEDGER_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Directories used by [`JsonLedgerStorage`].
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub ledger_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    pub fn under(base: &Path) -> Self {
        Self {
            ledger_root: base.join("ledgers"),
            backup_root: base.join("backups"),
        }
    }
}

/// Describes a persisted backup artifact for a student's ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerBackupInfo {
    pub student: String,
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub path: PathBuf,
}

/// Filesystem-backed JSON persistence for student ledgers and their backups.
#[derive(Debug, Clone)]
pub struct JsonLedgerStorage {
    ledgers_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonLedgerStorage {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.ledger_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            ledgers_dir: paths.ledger_root,
            backups_dir: paths.backup_root,
            retention: retention.max(1),
        })
    }

    pub fn ledger_path(&self, key: &str) -> PathBuf {
        self.ledgers_dir
            .join(format!("{}.{}", encode_key(key), LEDGER_EXTENSION))
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Copies the student's current ledger file into the backup directory.
    pub fn backup_ledger(&self, key: &str, note: Option<&str>) -> Result<LedgerBackupInfo, CoreError> {
        let source = self.ledger_path(key);
        if !source.exists() {
            return Err(CoreError::StudentNotFound(key.to_string()));
        }
        let info = self.copy_to_backup(key, &source, note)?;
        self.prune_backups(key)?;
        Ok(info)
    }

    /// Lists backups for a student, newest first.
    pub fn list_backups(&self, key: &str) -> Result<Vec<LedgerBackupInfo>, CoreError> {
        let dir = self.backup_dir(key);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let slug = encode_key(key);
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(LedgerBackupInfo {
                    student: key.to_string(),
                    id: file_name.to_string(),
                    created_at: parse_backup_timestamp(&slug, file_name),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|info| Reverse((info.created_at, info.id.clone())));
        Ok(entries)
    }

    /// Reads a backup without touching the current ledger. Making it current
    /// goes through `StudentLedgerStore::restore`, which keeps the revision
    /// moving forward.
    pub fn read_backup(&self, backup: &LedgerBackupInfo) -> Result<Ledger, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        load_ledger_from_path(&backup.path)
    }

    pub fn delete_backup(&self, key: &str, backup_id: &str) -> Result<(), CoreError> {
        let path = self.backup_dir(key).join(backup_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn backup_dir(&self, key: &str) -> PathBuf {
        self.backups_dir.join(encode_key(key))
    }

    fn copy_to_backup(
        &self,
        key: &str,
        source: &Path,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo, CoreError> {
        let dir = self.backup_dir(key);
        fs::create_dir_all(&dir)?;
        let now = Utc::now();
        let mut stem = format!("{}_{}", encode_key(key), now.format(BACKUP_TIMESTAMP_FORMAT));
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let file_name = next_backup_name(&dir, &stem)?;
        let path = dir.join(&file_name);
        fs::copy(source, &path)?;
        debug!(student = key, backup = %file_name, "ledger backup written");
        Ok(LedgerBackupInfo {
            student: key.to_string(),
            id: file_name,
            created_at: parse_backup_timestamp(&encode_key(key), &stem),
            path,
        })
    }

    fn prune_backups(&self, key: &str) -> Result<(), CoreError> {
        for entry in self.list_backups(key)?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                warn!(backup = %entry.id, %err, "failed to prune old backup");
            }
        }
        Ok(())
    }

    fn write_ledger(&self, key: &str, ledger: &Ledger) -> Result<(), CoreError> {
        let path = self.ledger_path(key);
        if path.exists() {
            self.copy_to_backup(key, &path, None)?;
            self.prune_backups(key)?;
        }
        save_ledger_to_path(ledger, &path)
    }
}

impl LedgerStorage for JsonLedgerStorage {
    fn load_ledger(&self, key: &str) -> Result<Option<Ledger>, CoreError> {
        match load_ledger_from_path(&self.ledger_path(key)) {
            Ok(ledger) => Ok(Some(ledger)),
            Err(CoreError::Io(err)) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save_ledger(&self, key: &str, ledger: &Ledger) -> Result<(), CoreError> {
        self.write_ledger(key, ledger)
    }

    fn delete_ledger(&self, key: &str) -> Result<(), CoreError> {
        let path = self.ledger_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, CoreError> {
        if !self.ledgers_dir.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.ledgers_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            if let Some(key) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(decode_key)
            {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Saves a ledger to an arbitrary path, staging through a temporary file.
pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<(), CoreError> {
    let json =
        serde_json::to_string_pretty(ledger).map_err(|err| CoreError::Serde(err.to_string()))?;
    write_replacing(path, &json)
}

/// Loads a ledger from the provided filesystem path.
pub fn load_ledger_from_path(path: &Path) -> Result<Ledger, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

/// Writes a whole-store snapshot file.
pub fn save_snapshot_to_path(snapshot: &StoreSnapshot, path: &Path) -> Result<(), CoreError> {
    let json =
        serde_json::to_string_pretty(snapshot).map_err(|err| CoreError::Serde(err.to_string()))?;
    write_replacing(path, &json)
}

/// Reads a snapshot file, rejecting documents that are not shaped as
/// student id → ledger.
pub fn load_snapshot_from_path(path: &Path) -> Result<StoreSnapshot, CoreError> {
    let data = fs::read_to_string(path)?;
    parse_snapshot(&data)
}

/// Maps a student key to a file stem. Lowercase alphanumerics, `-` and `_`
/// pass through; every other byte becomes `~XX`.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' => encoded.push(byte as char),
            other => encoded.push_str(&format!("~{other:02x}")),
        }
    }
    if encoded.is_empty() {
        "~".into()
    } else {
        encoded
    }
}

fn decode_key(stem: &str) -> Option<String> {
    if stem == "~" {
        return Some(String::new());
    }
    let mut bytes = Vec::with_capacity(stem.len());
    let raw = stem.as_bytes();
    let mut idx = 0;
    while idx < raw.len() {
        if raw[idx] == b'~' {
            let hex = stem.get(idx + 1..idx + 3)?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            idx += 3;
        } else {
            bytes.push(raw[idx]);
            idx += 1;
        }
    }
    String::from_utf8(bytes).ok()
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Picks a free file name for `stem`. Backups taken within the same second
/// get a `_NNN` counter past the highest one already present, so a pruned
/// name is never reused for a newer backup.
fn next_backup_name(dir: &Path, stem: &str) -> Result<String, CoreError> {
    let suffix = format!(".{}", LEDGER_EXTENSION);
    let mut highest = 0u32;
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        let Some(rest) = name
            .to_str()
            .and_then(|name| name.strip_prefix(stem))
            .and_then(|rest| rest.strip_suffix(suffix.as_str()))
        else {
            continue;
        };
        let counter = if rest.is_empty() {
            Some(1)
        } else {
            rest.strip_prefix('_')
                .filter(|digits| is_digits(digits, 3))
                .and_then(|digits| digits.parse::<u32>().ok())
        };
        if let Some(counter) = counter {
            highest = highest.max(counter);
        }
    }
    Ok(match highest {
        0 => format!("{stem}{suffix}"),
        taken => format!("{stem}_{:03}{suffix}", taken + 1),
    })
}

/// Reads the `YYYYmmdd_HHMMSS` stamp that follows `<slug>_` in a backup name.
fn parse_backup_timestamp(slug: &str, name: &str) -> Option<DateTime<Utc>> {
    let stem = name
        .strip_suffix(&format!(".{}", LEDGER_EXTENSION))
        .unwrap_or(name);
    let rest = stem.strip_prefix(slug)?.strip_prefix('_')?;
    let mut segments = rest.split('_');
    let date = segments.next()?;
    let time = segments.next()?;
    if !is_digits(date, 8) || !is_digits(time, 6) {
        return None;
    }
    NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_replacing(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}
