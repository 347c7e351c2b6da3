//! Per-student ledger holding subjects and the attendance log.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{entry::AttendanceEntry, student::StudentId, subject::Subject};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// All attendance state owned by a single student.
///
/// `history` is an append log; entries are never reordered in place. Readers
/// that need chronological order sort at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    pub student_id: StudentId,
    #[serde(default)]
    pub subjects: BTreeMap<Uuid, Subject>,
    #[serde(default)]
    pub history: Vec<AttendanceEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub next_sequence: u64,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

/// Subject whose stored total disagreed with its history before reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateDrift {
    pub subject_id: Uuid,
    pub stored: i64,
    pub derived: i64,
}

impl Ledger {
    pub fn new(student_id: impl Into<StudentId>) -> Self {
        let now = Utc::now();
        Self {
            student_id: student_id.into(),
            subjects: BTreeMap::new(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
            revision: 0,
            next_sequence: 0,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn subject(&self, id: Uuid) -> Option<&Subject> {
        self.subjects.get(&id)
    }

    pub fn subject_mut(&mut self, id: Uuid) -> Option<&mut Subject> {
        self.subjects.get_mut(&id)
    }

    /// Looks up a subject by name, ignoring case.
    pub fn subject_by_name(&self, name: &str) -> Option<&Subject> {
        self.subjects
            .values()
            .find(|subject| subject.matches_name(name))
    }

    pub fn entry(&self, id: Uuid) -> Option<&AttendanceEntry> {
        self.history.iter().find(|entry| entry.id == id)
    }

    pub fn entry_mut(&mut self, id: Uuid) -> Option<&mut AttendanceEntry> {
        self.history.iter_mut().find(|entry| entry.id == id)
    }

    /// Entries referencing `subject_id`, in insertion order.
    pub fn entries_for(&self, subject_id: Uuid) -> impl Iterator<Item = &AttendanceEntry> + '_ {
        self.history
            .iter()
            .filter(move |entry| entry.subject_id == subject_id)
    }

    /// Sums the history for `subject_id` without consulting the stored total.
    pub fn derived_hours(&self, subject_id: Uuid) -> i64 {
        self.entries_for(subject_id)
            .map(|entry| i64::from(entry.hours))
            .sum()
    }

    pub fn insert_subject(&mut self, subject: Subject) -> Uuid {
        let id = subject.id;
        self.subjects.insert(id, subject);
        self.touch();
        id
    }

    pub fn remove_subject(&mut self, id: Uuid) -> Option<Subject> {
        let removed = self.subjects.remove(&id);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    /// Appends `entry` to the log, stamping it with the next sequence number.
    pub fn append_entry(&mut self, mut entry: AttendanceEntry) -> Uuid {
        entry.sequence = self.next_sequence;
        self.next_sequence += 1;
        let id = entry.id;
        self.history.push(entry);
        self.touch();
        id
    }

    pub fn remove_entry(&mut self, id: Uuid) -> Option<AttendanceEntry> {
        let index = self.history.iter().position(|entry| entry.id == id)?;
        let removed = self.history.remove(index);
        self.touch();
        Some(removed)
    }

    /// Drops every entry referencing `subject_id`, returning how many went.
    pub fn remove_entries_for(&mut self, subject_id: Uuid) -> usize {
        let before = self.history.len();
        self.history.retain(|entry| entry.subject_id != subject_id);
        let removed = before - self.history.len();
        if removed > 0 {
            self.touch();
        }
        removed
    }

    /// Compares each subject's stored total with its history.
    pub fn aggregate_drift(&self) -> Vec<AggregateDrift> {
        self.subjects
            .values()
            .filter_map(|subject| {
                let derived = self.derived_hours(subject.id);
                (derived != subject.hours_absent).then_some(AggregateDrift {
                    subject_id: subject.id,
                    stored: subject.hours_absent,
                    derived,
                })
            })
            .collect()
    }

    /// Rewrites every subject total from the history log and returns the
    /// subjects that were out of step.
    pub fn reconcile_aggregates(&mut self) -> Vec<AggregateDrift> {
        let drift = self.aggregate_drift();
        for item in &drift {
            if let Some(subject) = self.subjects.get_mut(&item.subject_id) {
                subject.hours_absent = item.derived;
            }
        }
        let max_sequence = self.history.iter().map(|entry| entry.sequence + 1).max();
        if let Some(next) = max_sequence {
            self.next_sequence = self.next_sequence.max(next);
        }
        drift
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn touch_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
