//! Student identity resolution and the explicit session value passed to every
//! tracker call.

use std::env;

use attend_domain::{Student, StudentId};
use serde::{Deserialize, Serialize};

use crate::errors::{AttendanceError, AttendanceResult};

/// Environment variable read by [`EnvIdentity`].
pub const STUDENT_ENV: &str = "ATTENDANCE_STUDENT";

/// Supplies the identifier of the student being served. No credential checks.
pub trait IdentityResolver {
    fn current_student_id(&self) -> Option<StudentId>;
}

/// Always resolves to the same student.
#[derive(Debug, Clone)]
pub struct FixedIdentity(StudentId);

impl FixedIdentity {
    pub fn new(id: impl Into<StudentId>) -> Self {
        Self(id.into())
    }
}

impl IdentityResolver for FixedIdentity {
    fn current_student_id(&self) -> Option<StudentId> {
        Some(self.0.clone()).filter(|id| !id.is_blank())
    }
}

/// Reads the student id from `ATTENDANCE_STUDENT`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvIdentity;

impl IdentityResolver for EnvIdentity {
    fn current_student_id(&self) -> Option<StudentId> {
        env::var(STUDENT_ENV)
            .ok()
            .map(StudentId::from)
            .filter(|id| !id.is_blank())
    }
}

/// The student a sequence of tracker calls acts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub student: Student,
}

impl Session {
    pub fn new(student: Student) -> Self {
        Self { student }
    }

    pub fn for_student(id: impl Into<StudentId>) -> Self {
        Self::new(Student::anonymous(id))
    }

    /// Builds a session from the first resolver that yields an id.
    pub fn resolve(resolvers: &[&dyn IdentityResolver]) -> AttendanceResult<Self> {
        resolvers
            .iter()
            .find_map(|resolver| resolver.current_student_id())
            .map(Self::for_student)
            .ok_or(AttendanceError::NoStudent)
    }

    pub fn student_id(&self) -> &StudentId {
        &self.student.id
    }
}
