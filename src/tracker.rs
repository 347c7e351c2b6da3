//! High-level facade running the load → mutate → save → project cycle for a
//! session's ledger.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use attend_core::{
    AttendanceService, Clock, CoreError, CoreResult, EntryRemoval, EntryUpdate, ImportReport,
    InMemoryLedgerStorage, LedgerStorage, StudentLedgerStore, SubjectRemoval, SubjectService,
    ViewService,
};
use attend_domain::{
    AttendanceEntry, EmptySubjectPolicy, HistoryRow, Ledger, LedgerSummary, StoreSnapshot,
    StudentId, Subject, SubjectStatus,
};

use crate::{errors::AttendanceResult, identity::Session};

/// Tracks absences for whichever student a [`Session`] names.
pub struct AttendanceTracker {
    store: StudentLedgerStore,
    policy: EmptySubjectPolicy,
}

impl AttendanceTracker {
    pub fn new(store: StudentLedgerStore, policy: EmptySubjectPolicy) -> Self {
        Self { store, policy }
    }

    pub fn with_storage(
        storage: Box<dyn LedgerStorage>,
        clock: Arc<dyn Clock>,
        policy: EmptySubjectPolicy,
    ) -> Self {
        Self::new(StudentLedgerStore::new(storage, clock), policy)
    }

    /// Tracker over a fresh in-memory adapter.
    pub fn in_memory(clock: Arc<dyn Clock>, policy: EmptySubjectPolicy) -> Self {
        Self::with_storage(Box::new(InMemoryLedgerStorage::new()), clock, policy)
    }

    pub fn store(&self) -> &StudentLedgerStore {
        &self.store
    }

    pub fn policy(&self) -> EmptySubjectPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: EmptySubjectPolicy) {
        self.policy = policy;
    }

    pub fn today(&self) -> NaiveDate {
        self.store.clock().today()
    }

    /// The session's current ledger; empty when nothing is stored yet.
    pub fn ledger(&self, session: &Session) -> AttendanceResult<Ledger> {
        Ok(self.store.load(session.student_id())?)
    }

    pub fn resolve_subject(&self, session: &Session, reference: &str) -> AttendanceResult<Uuid> {
        let ledger = self.ledger(session)?;
        Ok(SubjectService::resolve(&ledger, reference)?)
    }

    pub fn resolve_entry(&self, session: &Session, reference: &str) -> AttendanceResult<Uuid> {
        let ledger = self.ledger(session)?;
        Ok(AttendanceService::resolve_entry(&ledger, reference)?)
    }

    pub fn add_subject(
        &self,
        session: &Session,
        name: &str,
        credits: f64,
    ) -> AttendanceResult<Subject> {
        self.mutate(session, |ledger| SubjectService::add(ledger, name, credits))
    }

    pub fn edit_subject(
        &self,
        session: &Session,
        subject_id: Uuid,
        name: &str,
        credits: f64,
    ) -> AttendanceResult<Subject> {
        self.mutate(session, |ledger| {
            SubjectService::edit(ledger, subject_id, name, credits)
        })
    }

    /// Deletes a subject together with every entry that references its id.
    pub fn delete_subject(
        &self,
        session: &Session,
        subject_id: Uuid,
    ) -> AttendanceResult<SubjectRemoval> {
        let removal = self.mutate(session, |ledger| SubjectService::remove(ledger, subject_id))?;
        info!(
            student = %session.student_id(),
            subject = %removal.subject.name,
            removed_entries = removal.removed_entries,
            "subject deleted"
        );
        Ok(removal)
    }

    /// Records an absence; `date` defaults to the clock's today.
    pub fn mark_attendance(
        &self,
        session: &Session,
        subject_id: Uuid,
        hours: u32,
        date: Option<NaiveDate>,
    ) -> AttendanceResult<AttendanceEntry> {
        let date = date.unwrap_or_else(|| self.today());
        self.mutate(session, |ledger| {
            AttendanceService::mark(ledger, subject_id, hours, date)
        })
    }

    /// Marks against the subject called `name`, creating it with `credits`
    /// on first use.
    pub fn record_absence(
        &self,
        session: &Session,
        name: &str,
        credits: f64,
        hours: u32,
        date: Option<NaiveDate>,
    ) -> AttendanceResult<AttendanceEntry> {
        let date = date.unwrap_or_else(|| self.today());
        self.mutate(session, |ledger| {
            AttendanceService::record_absence(ledger, name, credits, hours, date)
        })
    }

    pub fn update_attendance(
        &self,
        session: &Session,
        entry_id: Uuid,
        hours: u32,
    ) -> AttendanceResult<EntryUpdate> {
        let policy = self.policy;
        let update = self.mutate(session, |ledger| {
            AttendanceService::update(ledger, entry_id, hours, policy)
        })?;
        if !update.aggregate_applied {
            warn!(entry = %entry_id, "updated entry has no subject; totals unchanged");
        }
        Ok(update)
    }

    pub fn delete_attendance(
        &self,
        session: &Session,
        entry_id: Uuid,
    ) -> AttendanceResult<EntryRemoval> {
        let policy = self.policy;
        self.mutate(session, |ledger| {
            AttendanceService::remove(ledger, entry_id, policy)
        })
    }

    /// Per-subject leave standing, ordered by subject name.
    pub fn subjects(&self, session: &Session) -> AttendanceResult<Vec<SubjectStatus>> {
        Ok(self.summary(session)?.subjects)
    }

    pub fn subject_status(
        &self,
        session: &Session,
        subject_id: Uuid,
    ) -> AttendanceResult<SubjectStatus> {
        let ledger = self.ledger(session)?;
        let subject = ledger
            .subject(subject_id)
            .ok_or_else(|| CoreError::SubjectNotFound(subject_id.to_string()))?;
        Ok(ViewService::subject_status(subject)?)
    }

    pub fn summary(&self, session: &Session) -> AttendanceResult<LedgerSummary> {
        let ledger = self.ledger(session)?;
        Ok(ViewService::ledger_summary(&ledger)?)
    }

    pub fn history(&self, session: &Session) -> AttendanceResult<Vec<HistoryRow>> {
        let ledger = self.ledger(session)?;
        Ok(ViewService::history(&ledger))
    }

    /// History rows for one subject, newest first.
    pub fn history_for(
        &self,
        session: &Session,
        subject_id: Uuid,
    ) -> AttendanceResult<Vec<HistoryRow>> {
        let ledger = self.ledger(session)?;
        Ok(ViewService::history_for(&ledger, subject_id))
    }

    pub fn audit(&self, session: &Session) -> AttendanceResult<Vec<String>> {
        let ledger = self.ledger(session)?;
        let warnings = ViewService::audit(&ledger);
        for warning in &warnings {
            warn!(student = %session.student_id(), "{warning}");
        }
        Ok(warnings)
    }

    /// Replaces the session's ledger with `ledger`, typically one read back
    /// from a backup. Writers still holding the replaced ledger will conflict.
    pub fn restore_ledger(&self, session: &Session, ledger: Ledger) -> AttendanceResult<Ledger> {
        let restored = self.store.restore(session.student_id(), ledger)?;
        info!(
            student = %session.student_id(),
            subjects = restored.subjects.len(),
            entries = restored.history.len(),
            "ledger replaced from backup"
        );
        Ok(restored)
    }

    pub fn students(&self) -> AttendanceResult<Vec<StudentId>> {
        Ok(self.store.students()?)
    }

    pub fn export_all(&self) -> AttendanceResult<StoreSnapshot> {
        Ok(self.store.export_all()?)
    }

    pub fn import_all(&self, snapshot: StoreSnapshot) -> AttendanceResult<ImportReport> {
        Ok(self.store.import_all(snapshot)?)
    }

    pub fn import_json(&self, text: &str) -> AttendanceResult<ImportReport> {
        Ok(self.store.import_json(text)?)
    }

    fn mutate<T>(
        &self,
        session: &Session,
        op: impl FnOnce(&mut Ledger) -> CoreResult<T>,
    ) -> AttendanceResult<T> {
        let student = session.student_id();
        let mut ledger = self.store.load(student)?;
        let outcome = op(&mut ledger)?;
        self.store.save(student, &mut ledger)?;
        debug!(student = %student, revision = ledger.revision, "mutation persisted");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 9, 16, 8, 0, 0).unwrap()
        }
    }

    fn tracker(policy: EmptySubjectPolicy) -> AttendanceTracker {
        AttendanceTracker::in_memory(Arc::new(FixedClock), policy)
    }

    #[test]
    fn mark_defaults_to_clock_today_and_persists() {
        let tracker = tracker(EmptySubjectPolicy::Prune);
        let session = Session::for_student("s1");
        let subject = tracker.add_subject(&session, "DBMS", 4.0).unwrap();

        let entry = tracker
            .mark_attendance(&session, subject.id, 2, None)
            .unwrap();

        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 9, 16).unwrap());
        let ledger = tracker.ledger(&session).unwrap();
        assert_eq!(ledger.revision, 2);
        assert_eq!(ledger.subject(subject.id).unwrap().hours_absent, 2);
    }

    #[test]
    fn failed_mutation_is_not_saved() {
        let tracker = tracker(EmptySubjectPolicy::Prune);
        let session = Session::for_student("s1");
        tracker.add_subject(&session, "DBMS", 4.0).unwrap();
        let before = tracker.ledger(&session).unwrap();

        let err = tracker.add_subject(&session, "dbms", 3.0).unwrap_err();
        assert!(matches!(
            err,
            crate::AttendanceError::Core(CoreError::DuplicateSubject(_))
        ));
        assert_eq!(tracker.ledger(&session).unwrap(), before);
    }

    #[test]
    fn sessions_are_isolated() {
        let tracker = tracker(EmptySubjectPolicy::Prune);
        let alice = Session::for_student("alice");
        let bob = Session::for_student("bob");
        tracker.add_subject(&alice, "OS", 3.0).unwrap();

        assert!(tracker.subjects(&bob).unwrap().is_empty());
        assert_eq!(tracker.subjects(&alice).unwrap().len(), 1);
    }
}
