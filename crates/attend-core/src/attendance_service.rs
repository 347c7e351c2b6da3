//! Attendance mutations that keep each subject's absence total equal to the
//! sum of its history entries.

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use attend_domain::{AttendanceEntry, EmptySubjectPolicy, Ledger, Subject};

use crate::{
    subject_service::{unique_prefix_match, SubjectService},
    CoreError, CoreResult,
};

/// Result of changing an entry's hours.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryUpdate {
    pub entry: AttendanceEntry,
    pub previous_hours: u32,
    pub delta: i64,
    /// `false` when the entry's subject no longer exists and no total moved.
    pub aggregate_applied: bool,
    pub pruned_subject: Option<Subject>,
}

/// Result of deleting an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRemoval {
    pub entry: AttendanceEntry,
    pub pruned_subject: Option<Subject>,
}

/// Provides validated CRUD helpers for the attendance log.
pub struct AttendanceService;

impl AttendanceService {
    /// Records `hours` of absence against an existing subject.
    pub fn mark(
        ledger: &mut Ledger,
        subject_id: Uuid,
        hours: u32,
        date: NaiveDate,
    ) -> CoreResult<AttendanceEntry> {
        if ledger.subject(subject_id).is_none() {
            return Err(CoreError::SubjectNotFound(subject_id.to_string()));
        }
        validate_hours(hours)?;
        let entry = AttendanceEntry::new(subject_id, date, hours);
        let entry_id = ledger.append_entry(entry);
        if let Some(subject) = ledger.subject_mut(subject_id) {
            subject.hours_absent += i64::from(hours);
        }
        let stored = ledger
            .entry(entry_id)
            .cloned()
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.to_string()))?;
        debug!(subject = %subject_id, entry = %entry_id, hours, %date, "absence marked");
        Ok(stored)
    }

    /// Marks an absence against the subject called `name`, creating the
    /// subject with `credits` when it does not exist yet.
    pub fn record_absence(
        ledger: &mut Ledger,
        name: &str,
        credits: f64,
        hours: u32,
        date: NaiveDate,
    ) -> CoreResult<AttendanceEntry> {
        validate_hours(hours)?;
        let subject_id = match ledger.subject_by_name(name) {
            Some(subject) => subject.id,
            None => SubjectService::add(ledger, name, credits)?.id,
        };
        Self::mark(ledger, subject_id, hours, date)
    }

    /// Replaces an entry's hours and moves the owning subject's total by the
    /// difference. Orphaned entries change without touching any total.
    pub fn update(
        ledger: &mut Ledger,
        entry_id: Uuid,
        new_hours: u32,
        policy: EmptySubjectPolicy,
    ) -> CoreResult<EntryUpdate> {
        let previous_hours = ledger
            .entry(entry_id)
            .map(|entry| entry.hours)
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.to_string()))?;
        validate_hours(new_hours)?;

        let delta = i64::from(new_hours) - i64::from(previous_hours);
        let entry = ledger
            .entry_mut(entry_id)
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.to_string()))?;
        entry.hours = new_hours;
        let entry = entry.clone();

        let aggregate_applied = match ledger.subject_mut(entry.subject_id) {
            Some(subject) => {
                subject.hours_absent += delta;
                true
            }
            None => false,
        };
        ledger.touch();
        let pruned_subject = apply_empty_policy(ledger, entry.subject_id, policy);
        debug!(entry = %entry_id, previous_hours, new_hours, aggregate_applied, "entry updated");
        Ok(EntryUpdate {
            entry,
            previous_hours,
            delta,
            aggregate_applied,
            pruned_subject,
        })
    }

    /// Deletes an entry and subtracts its hours from the owning subject.
    pub fn remove(
        ledger: &mut Ledger,
        entry_id: Uuid,
        policy: EmptySubjectPolicy,
    ) -> CoreResult<EntryRemoval> {
        let entry = ledger
            .remove_entry(entry_id)
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.to_string()))?;
        if let Some(subject) = ledger.subject_mut(entry.subject_id) {
            subject.hours_absent -= i64::from(entry.hours);
        }
        let pruned_subject = apply_empty_policy(ledger, entry.subject_id, policy);
        debug!(
            entry = %entry_id,
            hours = entry.hours,
            pruned = pruned_subject.is_some(),
            "entry removed"
        );
        Ok(EntryRemoval {
            entry,
            pruned_subject,
        })
    }

    /// Returns the log ordered for display: newest date first, then newest
    /// insertion first.
    pub fn list(ledger: &Ledger) -> Vec<&AttendanceEntry> {
        let mut entries: Vec<&AttendanceEntry> = ledger.history.iter().collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date).then(b.sequence.cmp(&a.sequence)));
        entries
    }

    /// Resolves a full entry id or a unique prefix of one.
    pub fn resolve_entry(ledger: &Ledger, reference: &str) -> CoreResult<Uuid> {
        let reference = reference.trim();
        if let Ok(id) = Uuid::parse_str(reference) {
            if ledger.entry(id).is_some() {
                return Ok(id);
            }
        }
        unique_prefix_match(ledger.history.iter().map(|entry| entry.id), reference)
            .ok_or_else(|| CoreError::EntryNotFound(reference.to_string()))
    }
}

fn validate_hours(hours: u32) -> CoreResult<()> {
    if hours == 0 {
        return Err(CoreError::InvalidHours("hours must be at least 1".into()));
    }
    Ok(())
}

/// Drops a subject whose total fell to zero or below when the policy asks for
/// it. Any entries still pointing at it go too, so no entry is left dangling.
fn apply_empty_policy(
    ledger: &mut Ledger,
    subject_id: Uuid,
    policy: EmptySubjectPolicy,
) -> Option<Subject> {
    if !policy.prunes() {
        return None;
    }
    let exhausted = ledger
        .subject(subject_id)
        .map(|subject| subject.hours_absent <= 0)
        .unwrap_or(false);
    if !exhausted {
        return None;
    }
    let subject = ledger.remove_subject(subject_id)?;
    ledger.remove_entries_for(subject_id);
    debug!(subject = %subject_id, name = %subject.name, "empty subject pruned");
    Some(subject)
}
