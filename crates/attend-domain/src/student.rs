use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque student key handed out by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StudentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StudentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A student as seen by the tracker: an opaque id plus a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub display_name: String,
}

impl Student {
    pub fn new(id: impl Into<StudentId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// Builds a student whose display name mirrors the identifier.
    pub fn anonymous(id: impl Into<StudentId>) -> Self {
        let id = id.into();
        let display_name = id.to_string();
        Self { id, display_name }
    }
}
