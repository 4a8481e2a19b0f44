//! Student models and the filters/patches used by the student store.

use crate::ids::{AcademicSessionId, ClassId, StudentId};
use crate::terms::TermName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Promotion status of a student. Stored as the `student_status` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "student_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Active,
    Graduated,
    Repeated,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Graduated => "graduated",
            Self::Repeated => "repeated",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub admission_number: Option<String>,
    /// Current class. Historical classes live in `student_class_history`.
    pub class_id: ClassId,
    pub admission_academic_session_id: Option<AcademicSessionId>,
    pub admission_term: Option<TermName>,
    pub status: StudentStatus,
    pub promoted_this_session: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub class_id: Option<ClassId>,
}

/// Partial update applied by the promotion orchestrator. `None` leaves the
/// column untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub class_id: Option<ClassId>,
    pub status: Option<StudentStatus>,
    pub promoted_this_session: Option<bool>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self.class_id.is_none() && self.status.is_none() && self.promoted_this_session.is_none()
    }

    /// Apply the patch to an in-memory student.
    pub fn apply(&self, student: &mut Student) {
        if let Some(class_id) = self.class_id {
            student.class_id = class_id;
        }
        if let Some(status) = self.status {
            student.status = status;
        }
        if let Some(promoted) = self.promoted_this_session {
            student.promoted_this_session = promoted;
        }
    }
}
