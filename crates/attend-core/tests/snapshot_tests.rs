use std::sync::Arc;

use attend_core::{
    AttendanceService, Clock, CoreError, InMemoryLedgerStorage, StudentLedgerStore, SubjectService,
};
use attend_domain::{AttendanceEntry, StoreSnapshot, StudentId, Subject};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn store() -> StudentLedgerStore {
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 10, 1, 9, 30, 0).unwrap());
    StudentLedgerStore::new(Box::new(InMemoryLedgerStorage::new()), Arc::new(clock))
}

fn seed(store: &StudentLedgerStore) {
    let date = NaiveDate::from_ymd_opt(2024, 9, 20).unwrap();
    for (student, subject, credits, hours) in [
        ("alice", "DBMS", 4.0, 6),
        ("alice", "Lab1", 1.5, 2),
        ("bob", "Maths", 4.5, 3),
    ] {
        let id = StudentId::from(student);
        let mut ledger = store.load(&id).unwrap();
        AttendanceService::record_absence(&mut ledger, subject, credits, hours, date).unwrap();
        store.save(&id, &mut ledger).unwrap();
    }
}

#[test]
fn export_then_import_reproduces_the_store() {
    let source = store();
    seed(&source);
    let exported = source.export_all().unwrap();
    assert_eq!(exported.len(), 2);

    let target = store();
    let report = target.import_all(exported.clone()).unwrap();
    assert_eq!(report.imported, 2);
    assert!(report.warnings.is_empty());
    assert_eq!(target.export_all().unwrap(), exported);
}

#[test]
fn json_export_round_trips_through_import_json() {
    let source = store();
    seed(&source);
    let json = source.export_json().unwrap();

    let target = store();
    target.import_json(&json).unwrap();
    assert_eq!(target.export_all().unwrap(), source.export_all().unwrap());
}

#[test]
fn import_replaces_students_missing_from_snapshot() {
    let target = store();
    seed(&target);
    let mut snapshot = target.export_all().unwrap();
    snapshot.ledgers.remove(&StudentId::from("bob"));

    let report = target.import_all(snapshot).unwrap();
    assert_eq!(report.removed, 1);
    assert_eq!(target.students().unwrap(), vec![StudentId::from("alice")]);
}

#[test]
fn malformed_snapshots_fail_without_touching_the_store() {
    let target = store();
    seed(&target);
    let before = target.export_all().unwrap();

    for text in [
        "[1, 2, 3]",
        "\"ledger\"",
        "{\"alice\": {\"subjects\": 4}}",
        "not json",
    ] {
        let err = target.import_json(text).expect_err("invalid snapshot");
        assert!(
            matches!(err, CoreError::InvalidFormat(_)),
            "{text}: unexpected error {err:?}"
        );
    }
    assert_eq!(target.export_all().unwrap(), before);
}

#[test]
fn import_rejects_ledger_filed_under_wrong_student() {
    let source = store();
    seed(&source);
    let mut snapshot = source.export_all().unwrap();
    let alice = snapshot.ledgers.remove(&StudentId::from("alice")).unwrap();
    snapshot.insert(StudentId::from("mallory"), alice);

    let err = store().import_all(snapshot).unwrap_err();
    assert!(matches!(err, CoreError::InvalidFormat(_)));
}

#[test]
fn import_corrects_drifted_totals_and_reports_them() {
    let source = store();
    seed(&source);
    let mut snapshot = source.export_all().unwrap();
    let ledger = snapshot.ledgers.get_mut(&StudentId::from("bob")).unwrap();
    let subject_id = *ledger.subjects.keys().next().unwrap();
    ledger.subjects.get_mut(&subject_id).unwrap().hours_absent = 40;

    let target = store();
    let report = target.import_all(snapshot).unwrap();
    assert_eq!(report.warnings.len(), 1);
    let bob = target.load(&StudentId::from("bob")).unwrap();
    assert_eq!(bob.subject(subject_id).unwrap().hours_absent, 3);
    assert!(SubjectService::list(&bob).len() == 1);
}

fn seeded_snapshot() -> StoreSnapshot {
    let source = store();
    seed(&source);
    source.export_all().unwrap()
}

fn assert_import_rejected(snapshot: StoreSnapshot) {
    let target = store();
    seed(&target);
    let before = target.export_all().unwrap();

    let err = target.import_all(snapshot).unwrap_err();
    assert!(matches!(err, CoreError::InvalidFormat(_)), "unexpected error: {err:?}");
    assert_eq!(target.export_all().unwrap(), before);
}

#[test]
fn import_rejects_subject_filed_under_another_id() {
    let mut snapshot = seeded_snapshot();
    let alice = snapshot.ledgers.get_mut(&StudentId::from("alice")).unwrap();
    let id = *alice.subjects.keys().next().unwrap();
    let subject = alice.subjects.remove(&id).unwrap();
    alice.subjects.insert(Uuid::new_v4(), subject);

    assert_import_rejected(snapshot);
}

#[test]
fn import_rejects_names_that_collide_ignoring_case() {
    let mut snapshot = seeded_snapshot();
    let alice = snapshot.ledgers.get_mut(&StudentId::from("alice")).unwrap();
    let twin = Subject::new(" dbms ", 3.0);
    alice.subjects.insert(twin.id, twin);

    assert_import_rejected(snapshot);
}

#[test]
fn import_rejects_entries_without_a_subject() {
    let mut snapshot = seeded_snapshot();
    let bob = snapshot.ledgers.get_mut(&StudentId::from("bob")).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 9, 21).unwrap();
    bob.history.push(AttendanceEntry::new(Uuid::new_v4(), date, 2));

    assert_import_rejected(snapshot);
}

#[test]
fn import_rejects_repeated_entry_ids() {
    let mut snapshot = seeded_snapshot();
    let bob = snapshot.ledgers.get_mut(&StudentId::from("bob")).unwrap();
    let copy = bob.history[0].clone();
    bob.history.push(copy);

    assert_import_rejected(snapshot);
}

#[test]
fn imported_subjects_accept_marks_through_name_lookup() {
    let snapshot = seeded_snapshot();
    let target = store();
    target.import_all(snapshot).unwrap();

    let alice = StudentId::from("alice");
    let mut ledger = target.load(&alice).unwrap();
    let id = SubjectService::resolve(&ledger, "dbms").unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 9, 23).unwrap();
    AttendanceService::mark(&mut ledger, id, 2, date).unwrap();
    assert_eq!(ledger.subject(id).unwrap().hours_absent, 8);
}
