//! Read-only projections over a ledger. Computed on demand, never persisted.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Leave-budget standing of a single subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubjectStatus {
    pub subject_id: Uuid,
    pub name: String,
    pub credits: f64,
    pub hours_absent: i64,
    pub max_leave: u32,
    pub remaining_hours: i64,
    pub is_critical: bool,
}

impl SubjectStatus {
    pub fn standing(&self) -> Standing {
        if self.is_critical {
            Standing::Critical
        } else if self.remaining_hours == 0 {
            Standing::Exhausted
        } else {
            Standing::WithinBudget
        }
    }
}

/// Coarse label for a subject's remaining leave.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Standing {
    WithinBudget,
    Exhausted,
    Critical,
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Standing::WithinBudget => "OK",
            Standing::Exhausted => "No leave left",
            Standing::Critical => "Critical",
        };
        f.write_str(label)
    }
}

/// Ledger-wide totals plus the per-subject statuses they were built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerSummary {
    pub subject_count: usize,
    pub entry_count: usize,
    pub total_hours_absent: i64,
    pub critical_count: usize,
    pub subjects: Vec<SubjectStatus>,
}

/// One history entry resolved against its subject for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRow {
    pub entry_id: Uuid,
    pub subject_id: Uuid,
    /// `None` when the entry references a subject that no longer exists.
    pub subject_name: Option<String>,
    pub date: NaiveDate,
    pub hours: u32,
}
