//! attend-core
//!
//! Leave-budget policy, ledger mutation services, derived views and the
//! student ledger store. Depends on attend-domain. No CLI, no terminal I/O;
//! persistence goes through the [`storage::LedgerStorage`] adapter trait.

pub mod attendance_service;
pub mod error;
pub mod memory_storage;
pub mod policy;
pub mod storage;
pub mod store;
pub mod subject_service;
pub mod time;
pub mod view_service;

pub use attendance_service::*;
pub use error::{CoreError, CoreResult};
pub use memory_storage::InMemoryLedgerStorage;
pub use policy::{max_leave_hours, parse_credits, parse_hours, validate_credits};
pub use storage::LedgerStorage;
pub use store::{check_ledger, parse_snapshot, ImportReport, StudentLedgerStore};
pub use subject_service::*;
pub use time::Clock;
pub use view_service::ViewService;
