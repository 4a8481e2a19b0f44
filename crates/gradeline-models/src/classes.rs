//! School class and subject models.

use crate::ids::{ClassId, SubjectId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A class level such as "JSS 2" or "Primary 4". The name is free text; class
/// progression parses it to find the next level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SchoolClass {
    pub id: ClassId,
    pub name: String,
    pub form_teacher_id: Option<UserId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub code: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
