#![doc(test(attr(deny(warnings))))]

//! Attendance Core tracks per-subject absence hours against a credit-weighted
//! leave budget, one ledger per student, and ships the `attendance_cli` shell.

pub mod cli;
pub mod config;
pub mod errors;
pub mod identity;
pub mod tracker;
pub mod utils;

pub use errors::{AttendanceError, AttendanceResult};
pub use identity::{EnvIdentity, FixedIdentity, IdentityResolver, Session};
pub use tracker::AttendanceTracker;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Attendance Core tracing initialized.");
    });
}

/// Same as [`init`], but with a caller-supplied default filter directive.
pub fn init_with_directive(directive: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing_with(directive);
        tracing::info!(directive, "Attendance Core tracing initialized.");
    });
}
