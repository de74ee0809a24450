use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ClassId, StudentId, TeacherId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StudentError {
    #[error("student name cannot be empty")]
    EmptyName,

    #[error("class name cannot be empty")]
    EmptyClassName,
}

/// Student profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    id: StudentId,
    full_name: String,
    grade: Option<u8>,
    class_section: Option<String>,
}

impl Student {
    /// # Errors
    ///
    /// Returns `StudentError::EmptyName` if the trimmed name is empty.
    pub fn new(
        id: StudentId,
        full_name: impl Into<String>,
        grade: Option<u8>,
        class_section: Option<String>,
    ) -> Result<Self, StudentError> {
        let full_name = full_name.into().trim().to_owned();
        if full_name.is_empty() {
            return Err(StudentError::EmptyName);
        }
        Ok(Self {
            id,
            full_name,
            grade,
            class_section,
        })
    }

    #[must_use]
    pub fn id(&self) -> &StudentId {
        &self.id
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn grade(&self) -> Option<u8> {
        self.grade
    }

    #[must_use]
    pub fn class_section(&self) -> Option<&str> {
        self.class_section.as_deref()
    }

    /// First letter of the first and last name, for avatar badges.
    #[must_use]
    pub fn initials(&self) -> String {
        let mut parts = self.full_name.split_whitespace();
        let first = parts.next().and_then(|p| p.chars().next());
        let last = parts.last().and_then(|p| p.chars().next());
        first.into_iter().chain(last).collect()
    }
}

/// A teacher's class. Students join with `teacher_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    pub teacher_id: TeacherId,
    pub teacher_code: String,
}

impl Class {
    /// # Errors
    ///
    /// Returns `StudentError::EmptyClassName` if the trimmed name is empty.
    pub fn new(
        id: ClassId,
        name: impl Into<String>,
        teacher_id: TeacherId,
        teacher_code: impl Into<String>,
    ) -> Result<Self, StudentError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(StudentError::EmptyClassName);
        }
        Ok(Self {
            id,
            name,
            teacher_id,
            teacher_code: teacher_code.into(),
        })
    }
}
