//! Academic session domain models and DTOs.
//!
//! An academic session is a school year (e.g. "2024/2025"). At most one session
//! is current at a time; creating a session spawns its three terms.

use crate::ids::AcademicSessionId;
use crate::periods::{PeriodStatus, WithStatus};
use crate::terms::Term;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Academic session entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AcademicSession {
    pub id: AcademicSessionId,
    /// Unique label, e.g. "2024/2025"
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_current: bool,
    /// Pinned as current by an administrator; exempt from auto-transition.
    pub is_manual: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AcademicSession {
    pub fn status(&self, today: NaiveDate) -> PeriodStatus {
        PeriodStatus::derive(self.is_current, self.start_date, self.end_date, today)
    }

    /// Whether the inclusive windows of two sessions share at least one day.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }
}

/// DTO for creating a new academic session.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAcademicSessionDto {
    /// Name of the session (1-100 characters)
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub start_date: NaiveDate,
    /// Must be after `start_date`
    pub end_date: NaiveDate,
    /// Pin the new session as current immediately.
    #[serde(default)]
    pub is_current: bool,
}

/// Row to insert for a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAcademicSession {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_current: bool,
    pub is_manual: bool,
}

/// Session together with its terms, each carrying a derived status.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOverview {
    #[serde(flatten)]
    pub session: AcademicSession,
    pub status: PeriodStatus,
    pub terms: Vec<WithStatus<Term>>,
}

/// Result of a "what is current now" lookup. Either side may be absent.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentPeriod {
    pub session: Option<WithStatus<AcademicSession>>,
    pub term: Option<WithStatus<Term>>,
}
