use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ledger::Ledger, student::StudentId};

/// Serializable copy of a whole store: student id → ledger.
///
/// Serializes as a plain JSON object keyed by student id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct StoreSnapshot {
    pub ledgers: BTreeMap<StudentId, Ledger>,
}

impl StoreSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, student_id: StudentId, ledger: Ledger) {
        self.ledgers.insert(student_id, ledger);
    }

    pub fn get(&self, student_id: &StudentId) -> Option<&Ledger> {
        self.ledgers.get(student_id)
    }

    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }
}
