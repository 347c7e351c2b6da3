//! Shared traits and enums for attendance primitives.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exposes a stable identifier for entities stored in the ledger.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Controls what happens to a subject whose absence total drops to zero
/// after an entry is edited or deleted.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmptySubjectPolicy {
    /// Remove the subject together with its last entry.
    #[default]
    Prune,
    /// Keep the subject with a zero total.
    Keep,
}

impl EmptySubjectPolicy {
    pub fn from_prune_flag(prune: bool) -> Self {
        if prune {
            EmptySubjectPolicy::Prune
        } else {
            EmptySubjectPolicy::Keep
        }
    }

    pub fn prunes(self) -> bool {
        matches!(self, EmptySubjectPolicy::Prune)
    }
}

impl fmt::Display for EmptySubjectPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EmptySubjectPolicy::Prune => "prune",
            EmptySubjectPolicy::Keep => "keep",
        };
        f.write_str(label)
    }
}

/// Canonical form used for case-insensitive subject name comparisons.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
