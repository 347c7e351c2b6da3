//! Business logic helpers for subject management.

use tracing::debug;
use uuid::Uuid;

use attend_domain::{Ledger, Subject};

use crate::{policy::validate_credits, CoreError, CoreResult};

/// Shortest id prefix accepted when a subject or entry is referenced by text.
pub const MIN_ID_PREFIX: usize = 4;

/// Outcome of deleting a subject together with its history.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectRemoval {
    pub subject: Subject,
    pub removed_entries: usize,
}

/// Provides validated operations for [`Subject`] entities.
pub struct SubjectService;

impl SubjectService {
    /// Adds a new subject with a zero absence total.
    pub fn add(ledger: &mut Ledger, name: &str, credits: f64) -> CoreResult<Subject> {
        let name = Self::validate_name(ledger, None, name)?;
        let credits = validate_credits(credits)?;
        let subject = Subject::new(name, credits);
        ledger.insert_subject(subject.clone());
        debug!(subject = %subject.id, name = %subject.name, credits, "subject added");
        Ok(subject)
    }

    /// Renames and/or re-weights a subject. Its absence total is untouched.
    pub fn edit(ledger: &mut Ledger, id: Uuid, name: &str, credits: f64) -> CoreResult<Subject> {
        if ledger.subject(id).is_none() {
            return Err(CoreError::SubjectNotFound(id.to_string()));
        }
        let name = Self::validate_name(ledger, Some(id), name)?;
        let credits = validate_credits(credits)?;
        let subject = ledger
            .subject_mut(id)
            .ok_or_else(|| CoreError::SubjectNotFound(id.to_string()))?;
        subject.name = name;
        subject.credits = credits;
        let updated = subject.clone();
        ledger.touch();
        debug!(subject = %id, name = %updated.name, credits, "subject edited");
        Ok(updated)
    }

    /// Removes a subject and every history entry that references it by id.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> CoreResult<SubjectRemoval> {
        let subject = ledger
            .remove_subject(id)
            .ok_or_else(|| CoreError::SubjectNotFound(id.to_string()))?;
        let removed_entries = ledger.remove_entries_for(id);
        debug!(subject = %id, removed_entries, "subject removed");
        Ok(SubjectRemoval {
            subject,
            removed_entries,
        })
    }

    /// Returns the ledger's subjects ordered by name.
    pub fn list(ledger: &Ledger) -> Vec<&Subject> {
        let mut subjects: Vec<&Subject> = ledger.subjects.values().collect();
        subjects.sort_by_key(|subject| subject.name.to_lowercase());
        subjects
    }

    /// Resolves a textual reference (full id, case-insensitive name, or a
    /// unique id prefix) to a subject id.
    pub fn resolve(ledger: &Ledger, reference: &str) -> CoreResult<Uuid> {
        let reference = reference.trim();
        if let Ok(id) = Uuid::parse_str(reference) {
            if ledger.subject(id).is_some() {
                return Ok(id);
            }
        }
        if let Some(subject) = ledger.subject_by_name(reference) {
            return Ok(subject.id);
        }
        unique_prefix_match(ledger.subjects.keys().copied(), reference)
            .ok_or_else(|| CoreError::SubjectNotFound(reference.to_string()))
    }

    fn validate_name(ledger: &Ledger, exclude: Option<Uuid>, candidate: &str) -> CoreResult<String> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("subject name cannot be empty".into()));
        }
        let duplicate = ledger
            .subjects
            .values()
            .any(|subject| subject.matches_name(trimmed) && exclude != Some(subject.id));
        if duplicate {
            Err(CoreError::DuplicateSubject(trimmed.to_string()))
        } else {
            Ok(trimmed.to_string())
        }
    }
}

/// Finds the single id whose textual form starts with `prefix`.
pub(crate) fn unique_prefix_match(ids: impl Iterator<Item = Uuid>, prefix: &str) -> Option<Uuid> {
    let needle = prefix.to_ascii_lowercase();
    if needle.len() < MIN_ID_PREFIX {
        return None;
    }
    let mut matches = ids.filter(|id| id.to_string().starts_with(&needle));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}
