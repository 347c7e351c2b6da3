use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Identifiable;

/// A dated absence record for one subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceEntry {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub date: NaiveDate,
    pub hours: u32,
    /// Insertion stamp assigned by the owning ledger; breaks ties between
    /// entries that share a date.
    #[serde(default)]
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
}

impl AttendanceEntry {
    pub fn new(subject_id: Uuid, date: NaiveDate, hours: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            date,
            hours,
            sequence: 0,
            recorded_at: Utc::now(),
        }
    }
}

impl Identifiable for AttendanceEntry {
    fn id(&self) -> Uuid {
        self.id
    }
}
