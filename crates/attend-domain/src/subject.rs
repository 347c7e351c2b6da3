//! Domain types representing credit-weighted subjects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

/// A subject tracked in a student's ledger.
///
/// `hours_absent` is an aggregate of the ledger's history entries that
/// reference this subject. Only the engine services update it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    pub credits: f64,
    #[serde(default)]
    pub hours_absent: i64,
    pub created_at: DateTime<Utc>,
}

impl Subject {
    pub fn new(name: impl Into<String>, credits: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            credits,
            hours_absent: 0,
            created_at: Utc::now(),
        }
    }

    /// Returns `true` when `candidate` names this subject, ignoring case and
    /// surrounding whitespace.
    pub fn matches_name(&self, candidate: &str) -> bool {
        normalize_name(&self.name) == normalize_name(candidate)
    }
}

impl Identifiable for Subject {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Subject {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Subject {
    fn display_label(&self) -> String {
        format!("{} ({} credits)", self.name, self.credits)
    }
}
