#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, sync::Mutex};

use attend_core::Clock;
use attend_domain::EmptySubjectPolicy;
use attend_storage_json::{JsonLedgerStorage, StoragePaths};
use attendance_core::{config::AppSettings, AttendanceTracker};
use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 9, 16, 9, 30, 0).unwrap()))
}

/// Fresh application home directory that outlives the test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Tracker over JSON files in an isolated home, plus the storage handle.
pub fn setup_json_tracker(policy: EmptySubjectPolicy) -> (AttendanceTracker, JsonLedgerStorage) {
    let base = temp_home();
    let storage = JsonLedgerStorage::with_retention(StoragePaths::under(&base.join("data")), 3)
        .expect("create json storage backend");
    let tracker = AttendanceTracker::with_storage(Box::new(storage.clone()), fixed_clock(), policy);
    (tracker, storage)
}

pub fn settings_in(base: PathBuf) -> AppSettings {
    AppSettings::load_from(base).expect("load settings for temp dir")
}
