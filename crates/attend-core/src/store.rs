//! Student ledger store: one ledger per student over a [`LedgerStorage`] adapter.

use std::{collections::HashSet, sync::Arc};

use serde_json::Value;
use tracing::{debug, info, warn};

use attend_domain::{normalize_name, Ledger, StoreSnapshot, StudentId};

use crate::{storage::LedgerStorage, time::Clock, CoreError, CoreResult};

/// Outcome of replacing the store from a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub removed: usize,
    pub warnings: Vec<String>,
}

/// Loads and saves per-student ledgers, and moves whole-store snapshots in
/// and out.
pub struct StudentLedgerStore {
    storage: Box<dyn LedgerStorage>,
    clock: Arc<dyn Clock>,
}

impl StudentLedgerStore {
    pub fn new(storage: Box<dyn LedgerStorage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn storage(&self) -> &dyn LedgerStorage {
        self.storage.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Returns the student's ledger, or a fresh empty one when none is stored.
    ///
    /// Subject totals are rebuilt from the history log on the way in.
    pub fn load(&self, student_id: &StudentId) -> CoreResult<Ledger> {
        match self.storage.load_ledger(student_id.as_str())? {
            Some(mut ledger) => {
                let drift = ledger.reconcile_aggregates();
                for item in &drift {
                    warn!(
                        student = %student_id,
                        subject = %item.subject_id,
                        stored = item.stored,
                        derived = item.derived,
                        "repaired subject total that disagreed with history"
                    );
                }
                debug!(student = %student_id, revision = ledger.revision, "ledger loaded");
                Ok(ledger)
            }
            None => {
                let mut ledger = Ledger::new(student_id.clone());
                let now = self.clock.now();
                ledger.created_at = now;
                ledger.touch_at(now);
                debug!(student = %student_id, "no stored ledger, starting empty");
                Ok(ledger)
            }
        }
    }

    /// Persists `ledger`, stamping its modification time and revision.
    ///
    /// Fails with [`CoreError::Conflict`] when the stored ledger moved on since
    /// `ledger` was loaded. On any failure `ledger` is left as it was.
    pub fn save(&self, student_id: &StudentId, ledger: &mut Ledger) -> CoreResult<()> {
        if let Some(stored) = self.storage.load_ledger(student_id.as_str())? {
            if stored.revision != ledger.revision {
                return Err(CoreError::Conflict {
                    student: student_id.to_string(),
                    expected: ledger.revision,
                    found: stored.revision,
                });
            }
        }
        let mut next = ledger.clone();
        next.revision += 1;
        next.touch_at(self.clock.now());
        self.storage.save_ledger(student_id.as_str(), &next)?;
        info!(student = %student_id, revision = next.revision, "ledger saved");
        *ledger = next;
        Ok(())
    }

    /// Deletes the student's ledger. Returns `false` when nothing was stored.
    pub fn delete(&self, student_id: &StudentId) -> CoreResult<bool> {
        let existed = self.storage.load_ledger(student_id.as_str())?.is_some();
        if existed {
            self.storage.delete_ledger(student_id.as_str())?;
            info!(student = %student_id, "ledger deleted");
        }
        Ok(existed)
    }

    pub fn students(&self) -> CoreResult<Vec<StudentId>> {
        Ok(self
            .storage
            .list_keys()?
            .into_iter()
            .map(StudentId::from)
            .collect())
    }

    /// Copies every stored ledger into a snapshot.
    pub fn export_all(&self) -> CoreResult<StoreSnapshot> {
        let mut snapshot = StoreSnapshot::new();
        for key in self.storage.list_keys()? {
            if let Some(ledger) = self.storage.load_ledger(&key)? {
                snapshot.insert(StudentId::from(key), ledger);
            }
        }
        debug!(ledgers = snapshot.len(), "store exported");
        Ok(snapshot)
    }

    pub fn export_json(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(&self.export_all()?)
            .map_err(|err| CoreError::Serde(err.to_string()))
    }

    /// Replaces the store's contents with `snapshot`.
    ///
    /// Every ledger is validated before anything is written; students absent
    /// from the snapshot are removed.
    pub fn import_all(&self, snapshot: StoreSnapshot) -> CoreResult<ImportReport> {
        let mut report = ImportReport::default();
        let mut ledgers = Vec::with_capacity(snapshot.len());
        for (student_id, mut ledger) in snapshot.ledgers {
            if student_id.is_blank() {
                return Err(CoreError::InvalidFormat(
                    "snapshot contains a blank student id".into(),
                ));
            }
            check_ledger(&student_id, &ledger)?;
            for item in ledger.reconcile_aggregates() {
                report.warnings.push(format!(
                    "{}: subject {} total corrected from {} to {}",
                    student_id, item.subject_id, item.stored, item.derived
                ));
            }
            ledgers.push((student_id, ledger));
        }

        let incoming: Vec<&str> = ledgers.iter().map(|(id, _)| id.as_str()).collect();
        for key in self.storage.list_keys()? {
            if !incoming.contains(&key.as_str()) {
                self.storage.delete_ledger(&key)?;
                report.removed += 1;
            }
        }
        for (student_id, ledger) in &ledgers {
            self.storage.save_ledger(student_id.as_str(), ledger)?;
            report.imported += 1;
        }
        for warning in &report.warnings {
            warn!("{warning}");
        }
        info!(
            imported = report.imported,
            removed = report.removed,
            "store replaced from snapshot"
        );
        Ok(report)
    }

    /// Makes `ledger`, usually read back from a backup, the student's current
    /// ledger.
    ///
    /// The revision moves past both the stored one and the restored one, so a
    /// writer still holding the replaced ledger gets a conflict.
    pub fn restore(&self, student_id: &StudentId, mut ledger: Ledger) -> CoreResult<Ledger> {
        check_ledger(student_id, &ledger)?;
        let drift = ledger.reconcile_aggregates();
        let stored = self
            .storage
            .load_ledger(student_id.as_str())?
            .map(|current| current.revision)
            .unwrap_or(0);
        ledger.revision = stored.max(ledger.revision) + 1;
        ledger.touch_at(self.clock.now());
        self.storage.save_ledger(student_id.as_str(), &ledger)?;
        info!(
            student = %student_id,
            revision = ledger.revision,
            repaired = drift.len(),
            "ledger restored"
        );
        Ok(ledger)
    }

    /// Parses a JSON snapshot, checking that it is an object mapping student
    /// ids to ledgers, then imports it.
    pub fn import_json(&self, text: &str) -> CoreResult<ImportReport> {
        let snapshot = parse_snapshot(text)?;
        self.import_all(snapshot)
    }
}

/// Validates the shape of a JSON snapshot document.
pub fn parse_snapshot(text: &str) -> CoreResult<StoreSnapshot> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| CoreError::InvalidFormat(format!("not valid JSON: {err}")))?;
    let Value::Object(entries) = value else {
        return Err(CoreError::InvalidFormat(
            "expected an object mapping student ids to ledgers".into(),
        ));
    };
    let mut snapshot = StoreSnapshot::new();
    for (key, raw) in entries {
        let ledger: Ledger = serde_json::from_value(raw)
            .map_err(|err| CoreError::InvalidFormat(format!("ledger `{key}`: {err}")))?;
        snapshot.insert(StudentId::from(key), ledger);
    }
    Ok(snapshot)
}

/// Rejects ledgers the mutation services could never have produced: a ledger
/// filed under another student, subjects keyed by an id they do not carry,
/// names that collide ignoring case, repeated entry ids and entries whose
/// subject is missing.
pub fn check_ledger(student_id: &StudentId, ledger: &Ledger) -> CoreResult<()> {
    let invalid = |message: String| -> CoreResult<()> {
        Err(CoreError::InvalidFormat(format!("{student_id}: {message}")))
    };
    if ledger.student_id != *student_id {
        return invalid(format!("ledger belongs to `{}`", ledger.student_id));
    }
    let mut names = HashSet::new();
    for (key, subject) in &ledger.subjects {
        if *key != subject.id {
            return invalid(format!(
                "subject `{}` is filed under {key} but carries id {}",
                subject.name, subject.id
            ));
        }
        if !names.insert(normalize_name(&subject.name)) {
            return invalid(format!("subject name `{}` appears more than once", subject.name));
        }
    }
    let mut entries = HashSet::new();
    for entry in &ledger.history {
        if !entries.insert(entry.id) {
            return invalid(format!("entry {} appears more than once", entry.id));
        }
        if !ledger.subjects.contains_key(&entry.subject_id) {
            return invalid(format!(
                "entry {} references missing subject {}",
                entry.id, entry.subject_id
            ));
        }
    }
    Ok(())
}
