//! Historical class membership.

use crate::ids::{AcademicSessionId, ClassId, StudentClassHistoryId, StudentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The class a student actually sat in during a session. One row per
/// `(student, session)`; reports read it to show the as-of class after the
/// student has been promoted away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StudentClassHistory {
    pub id: StudentClassHistoryId,
    pub student_id: StudentId,
    pub academic_session_id: AcademicSessionId,
    pub class_id: ClassId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
