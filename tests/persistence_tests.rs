mod common;

use std::fs;

use attend_core::CoreError;
use attend_domain::{EmptySubjectPolicy, StudentId};
use attend_storage_json::{JsonLedgerStorage, LedgerBackupInfo};
use attendance_core::{AttendanceError, AttendanceTracker, Session};
use chrono::NaiveDate;

use common::{fixed_clock, setup_json_tracker, temp_home};

fn day(d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, 10, d)
}

#[test]
fn ledgers_survive_reopening_the_tracker() {
    let (tracker, storage) = setup_json_tracker(EmptySubjectPolicy::Prune);
    let session = Session::for_student("2021/CS/042");
    let subject = tracker.add_subject(&session, "DBMS", 4.0).unwrap();
    tracker.mark_attendance(&session, subject.id, 3, day(1)).unwrap();

    let reopened =
        AttendanceTracker::with_storage(Box::new(storage), fixed_clock(), EmptySubjectPolicy::Prune);
    let summary = reopened.summary(&session).unwrap();
    assert_eq!(summary.total_hours_absent, 3);
    assert_eq!(
        reopened.students().unwrap(),
        vec![StudentId::from("2021/CS/042")]
    );
}

#[test]
fn stale_writer_gets_a_conflict() {
    let (tracker, storage) = setup_json_tracker(EmptySubjectPolicy::Prune);
    let session = Session::for_student("s");
    tracker.add_subject(&session, "DBMS", 4.0).unwrap();

    let store = tracker.store();
    let mut stale = store.load(session.student_id()).unwrap();
    let mut fresh = store.load(session.student_id()).unwrap();
    store.save(session.student_id(), &mut fresh).unwrap();

    stale.subjects.clear();
    let err = store.save(session.student_id(), &mut stale).unwrap_err();
    assert!(matches!(err, CoreError::Conflict { expected: 1, found: 2, .. }));

    assert!(storage.ledger_path("s").exists());
    assert_eq!(tracker.ledger(&session).unwrap().subjects.len(), 1);
}

#[test]
fn totals_are_rebuilt_from_history_when_loading() {
    let (tracker, storage) = setup_json_tracker(EmptySubjectPolicy::Prune);
    let session = Session::for_student("s");
    let subject = tracker.add_subject(&session, "OS", 3.0).unwrap();
    tracker.mark_attendance(&session, subject.id, 4, day(2)).unwrap();

    let path = storage.ledger_path("s");
    let text = fs::read_to_string(&path).unwrap();
    fs::write(&path, text.replace("\"hours_absent\": 4", "\"hours_absent\": 40")).unwrap();

    let status = tracker.subject_status(&session, subject.id).unwrap();
    assert_eq!(status.hours_absent, 4);
    assert!(tracker.audit(&session).unwrap().is_empty());
}

#[test]
fn saves_rotate_backups_that_can_be_restored() {
    let (tracker, storage) = setup_json_tracker(EmptySubjectPolicy::Prune);
    let session = Session::for_student("s");
    let subject = tracker.add_subject(&session, "DBMS", 4.0).unwrap();
    for d in 1..=5 {
        tracker.mark_attendance(&session, subject.id, 1, day(d)).unwrap();
    }

    let backups: Vec<LedgerBackupInfo> = storage.list_backups("s").unwrap();
    assert!(!backups.is_empty());
    assert!(backups.len() <= storage.retention());

    let revision = tracker.ledger(&session).unwrap().revision;
    let backup = storage.read_backup(&backups[0]).unwrap();
    let restored = tracker.restore_ledger(&session, backup).unwrap();
    assert_eq!(restored.history.len(), 4);
    assert_eq!(restored.revision, revision + 1);
    assert_eq!(tracker.ledger(&session).unwrap().history.len(), 4);
}

#[test]
fn writer_holding_the_ledger_before_a_restore_conflicts() {
    let (tracker, storage) = setup_json_tracker(EmptySubjectPolicy::Prune);
    let session = Session::for_student("s");
    let subject = tracker.add_subject(&session, "DBMS", 4.0).unwrap();
    tracker.mark_attendance(&session, subject.id, 2, day(1)).unwrap();
    tracker.mark_attendance(&session, subject.id, 2, day(2)).unwrap();

    let store = tracker.store();
    let mut holder = store.load(session.student_id()).unwrap();
    let oldest = storage.list_backups("s").unwrap().pop().unwrap();
    tracker
        .restore_ledger(&session, storage.read_backup(&oldest).unwrap())
        .unwrap();

    holder.subjects.clear();
    let err = store.save(session.student_id(), &mut holder).unwrap_err();
    assert!(matches!(err, CoreError::Conflict { .. }), "{err:?}");
}

#[test]
fn export_then_import_reproduces_the_store() {
    let (source, _) = setup_json_tracker(EmptySubjectPolicy::Prune);
    for student in ["alice", "bob"] {
        let session = Session::for_student(student);
        source
            .record_absence(&session, "Lab1", 1.5, 2, day(3))
            .unwrap();
    }
    let snapshot = source.export_all().unwrap();

    let (target, _) = setup_json_tracker(EmptySubjectPolicy::Prune);
    target
        .add_subject(&Session::for_student("carol"), "Old", 3.0)
        .unwrap();
    let report = target.import_all(snapshot.clone()).unwrap();

    assert_eq!(report.imported, 2);
    assert_eq!(report.removed, 1);
    assert_eq!(target.export_all().unwrap(), snapshot);
}

#[test]
fn malformed_snapshot_leaves_store_untouched() {
    let (tracker, _) = setup_json_tracker(EmptySubjectPolicy::Prune);
    let session = Session::for_student("alice");
    tracker.add_subject(&session, "DBMS", 4.0).unwrap();
    let before = tracker.export_all().unwrap();

    for text in ["[1, 2]", r#"{"alice": {"subjects": 7}}"#, "not json"] {
        let err = tracker.import_json(text).unwrap_err();
        assert!(
            matches!(err, AttendanceError::Core(CoreError::InvalidFormat(_))),
            "{text}: {err:?}"
        );
    }
    assert_eq!(tracker.export_all().unwrap(), before);
}

#[test]
fn json_storage_under_a_fresh_home_starts_empty() {
    let base = temp_home();
    let settings = common::settings_in(base.clone());
    let storage: JsonLedgerStorage = settings.open_storage().unwrap();
    let tracker = AttendanceTracker::with_storage(Box::new(storage), fixed_clock(), settings.policy());

    assert!(tracker.students().unwrap().is_empty());
    let ledger = tracker.ledger(&Session::for_student("new")).unwrap();
    assert!(ledger.subjects.is_empty());
    assert!(base.join("data").join("ledgers").exists());
}
