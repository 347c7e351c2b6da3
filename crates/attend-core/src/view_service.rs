//! Derived views: remaining leave, critical flags and display history.

use std::collections::HashSet;

use uuid::Uuid;

use attend_domain::{HistoryRow, Ledger, LedgerSummary, Subject, SubjectStatus};

use crate::{attendance_service::AttendanceService, policy::max_leave_hours, CoreResult};

/// Builds read-only projections of a ledger.
pub struct ViewService;

impl ViewService {
    /// Leave budget, remaining hours and critical flag for one subject.
    pub fn subject_status(subject: &Subject) -> CoreResult<SubjectStatus> {
        let max_leave = max_leave_hours(subject.credits)?;
        let remaining_hours = i64::from(max_leave) - subject.hours_absent;
        Ok(SubjectStatus {
            subject_id: subject.id,
            name: subject.name.clone(),
            credits: subject.credits,
            hours_absent: subject.hours_absent,
            max_leave,
            remaining_hours,
            is_critical: remaining_hours < 0,
        })
    }

    /// Per-subject statuses (ordered by name) and ledger totals.
    pub fn ledger_summary(ledger: &Ledger) -> CoreResult<LedgerSummary> {
        let mut subjects = ledger
            .subjects
            .values()
            .map(Self::subject_status)
            .collect::<CoreResult<Vec<_>>>()?;
        subjects.sort_by_key(|status| status.name.to_lowercase());
        Ok(LedgerSummary {
            subject_count: subjects.len(),
            entry_count: ledger.history.len(),
            total_hours_absent: subjects.iter().map(|status| status.hours_absent).sum(),
            critical_count: subjects.iter().filter(|status| status.is_critical).count(),
            subjects,
        })
    }

    /// The whole attendance log in display order.
    pub fn history(ledger: &Ledger) -> Vec<HistoryRow> {
        AttendanceService::list(ledger)
            .into_iter()
            .map(|entry| HistoryRow {
                entry_id: entry.id,
                subject_id: entry.subject_id,
                subject_name: ledger
                    .subject(entry.subject_id)
                    .map(|subject| subject.name.clone()),
                date: entry.date,
                hours: entry.hours,
            })
            .collect()
    }

    /// History rows for a single subject in display order.
    pub fn history_for(ledger: &Ledger, subject_id: Uuid) -> Vec<HistoryRow> {
        Self::history(ledger)
            .into_iter()
            .filter(|row| row.subject_id == subject_id)
            .collect()
    }

    /// Detects dangling references, drifted totals and unusable credit weights.
    pub fn audit(ledger: &Ledger) -> Vec<String> {
        let subject_ids: HashSet<_> = ledger.subjects.keys().copied().collect();
        let mut warnings = Vec::new();

        for entry in &ledger.history {
            if !subject_ids.contains(&entry.subject_id) {
                warnings.push(format!(
                    "entry {} references missing subject {}",
                    entry.id, entry.subject_id
                ));
            }
        }
        for drift in ledger.aggregate_drift() {
            warnings.push(format!(
                "subject {} records {} hours but its history sums to {}",
                drift.subject_id, drift.stored, drift.derived
            ));
        }
        for subject in ledger.subjects.values() {
            if max_leave_hours(subject.credits).is_err() {
                warnings.push(format!(
                    "subject {} has unusable credit weight {}",
                    subject.id, subject.credits
                ));
            }
        }
        warnings
    }
}
