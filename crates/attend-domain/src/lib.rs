//! attend-domain
//!
//! Pure domain models (Student, Ledger, Subject, AttendanceEntry, views).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod common;
pub mod entry;
pub mod ledger;
pub mod snapshot;
pub mod student;
pub mod subject;
pub mod view;

pub use common::*;
pub use entry::*;
pub use ledger::*;
pub use snapshot::*;
pub use student::*;
pub use subject::*;
pub use view::*;
