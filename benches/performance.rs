use std::sync::Arc;

use attend_core::{AttendanceService, Clock, SubjectService, ViewService};
use attend_domain::{EmptySubjectPolicy, Ledger};
use attend_storage_json::{load_ledger_from_path, save_ledger_to_path};
use attendance_core::{AttendanceTracker, Session};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tempfile::tempdir;

struct BenchClock;

impl Clock for BenchClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

const SUBJECTS: [(&str, f64); 6] = [
    ("DBMS", 4.0),
    ("Operating Systems", 3.0),
    ("Maths", 4.5),
    ("Lab1", 1.5),
    ("Networks", 3.0),
    ("Compilers", 2.0),
];

fn build_sample_ledger(entry_count: usize) -> Ledger {
    let mut ledger = Ledger::new("bench");
    let ids: Vec<_> = SUBJECTS
        .iter()
        .map(|(name, credits)| SubjectService::add(&mut ledger, name, *credits).unwrap().id)
        .collect();
    let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    for idx in 0..entry_count {
        let date = start + Duration::days((idx % 150) as i64);
        let hours = 1 + (idx % 3) as u32;
        AttendanceService::mark(&mut ledger, ids[idx % ids.len()], hours, date).unwrap();
    }
    ledger
}

fn bench_ledger_io(c: &mut Criterion) {
    let ledger = build_sample_ledger(black_box(10_000));
    let dir = tempdir().expect("tempdir");
    let file_path = dir.path().join("ledger.json");

    c.bench_function("ledger_save_10k", |b| {
        b.iter(|| save_ledger_to_path(&ledger, &file_path).expect("save ledger"))
    });

    save_ledger_to_path(&ledger, &file_path).expect("seed");

    c.bench_function("ledger_load_10k", |b| {
        b.iter(|| {
            let loaded = load_ledger_from_path(&file_path).expect("load ledger");
            black_box(loaded);
        })
    });
}

fn bench_views(c: &mut Criterion) {
    let ledger = build_sample_ledger(black_box(10_000));

    c.bench_function("ledger_summary_10k", |b| {
        b.iter(|| black_box(ViewService::ledger_summary(&ledger).expect("summary")))
    });
    c.bench_function("history_sorted_10k", |b| {
        b.iter(|| black_box(ViewService::history(&ledger)))
    });
    c.bench_function("reconcile_10k", |b| {
        b.iter_batched(
            || ledger.clone(),
            |mut ledger| black_box(ledger.reconcile_aggregates()),
            BatchSize::LargeInput,
        )
    });
}

fn bench_tracker_mutations(c: &mut Criterion) {
    let tracker = AttendanceTracker::in_memory(Arc::new(BenchClock), EmptySubjectPolicy::Prune);
    let session = Session::for_student("bench");
    let subject = tracker.add_subject(&session, "DBMS", 4.0).expect("subject");
    let date = NaiveDate::from_ymd_opt(2024, 9, 2);
    // Keeps the subject above zero so the prune policy never removes it.
    tracker
        .mark_attendance(&session, subject.id, 1, date)
        .expect("seed entry");

    c.bench_function("tracker_mark_update_delete", |b| {
        b.iter(|| {
            let entry = tracker
                .mark_attendance(&session, subject.id, 2, date)
                .expect("mark");
            tracker
                .update_attendance(&session, entry.id, 3)
                .expect("update");
            tracker
                .delete_attendance(&session, entry.id)
                .expect("delete");
        })
    });
}

criterion_group!(benches, bench_ledger_io, bench_views, bench_tracker_mutations);
criterion_main!(benches);
