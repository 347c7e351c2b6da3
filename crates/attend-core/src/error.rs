use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Student not found: {0}")]
    StudentNotFound(String),
    #[error("Subject not found: {0}")]
    SubjectNotFound(String),
    #[error("Attendance entry not found: {0}")]
    EntryNotFound(String),
    #[error("Subject `{0}` already exists")]
    DuplicateSubject(String),
    #[error("Invalid hours: {0}")]
    InvalidHours(String),
    #[error("Invalid credits: {0}")]
    InvalidCredits(String),
    #[error("Invalid snapshot format: {0}")]
    InvalidFormat(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Ledger for `{student}` changed since it was loaded (revision {expected}, stored {found})")]
    Conflict {
        student: String,
        expected: u64,
        found: u64,
    },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CoreError {
    /// Returns `true` for the missing student/subject/entry family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::StudentNotFound(_)
                | CoreError::SubjectNotFound(_)
                | CoreError::EntryNotFound(_)
        )
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
