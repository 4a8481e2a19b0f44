//! Term domain models.
//!
//! Every academic session is split into exactly three terms (`first`, `second`,
//! `third`). Terms carry the same current/manual flags as sessions; the term
//! state machine keeps them in line with the calendar.

use crate::ids::{AcademicSessionId, TermId};
use crate::periods::PeriodStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Name of a term within a session. Stored as the `term_name` Postgres enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "term_name", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TermName {
    First,
    Second,
    Third,
}

impl TermName {
    pub const ALL: [TermName; 3] = [TermName::First, TermName::Second, TermName::Third];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Third => "third",
        }
    }

    /// Human label, e.g. "First Term".
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::First => "First Term",
            Self::Second => "Second Term",
            Self::Third => "Third Term",
        }
    }

    /// 1-based position within the session.
    pub fn sequence(&self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }
}

impl fmt::Display for TermName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTermNameError(pub String);

impl fmt::Display for ParseTermNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid term '{}', expected one of first, second, third",
            self.0
        )
    }
}

impl std::error::Error for ParseTermNameError {}

impl FromStr for TermName {
    type Err = ParseTermNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "1" => Ok(Self::First),
            "second" | "2" => Ok(Self::Second),
            "third" | "3" => Ok(Self::Third),
            _ => Err(ParseTermNameError(s.to_string())),
        }
    }
}

/// Term entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Term {
    pub id: TermId,
    pub academic_session_id: AcademicSessionId,
    pub name: TermName,
    /// "First Term", "Second Term", "Third Term"
    pub display_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_current: bool,
    /// Pinned as current by an administrator; exempt from auto-transition.
    pub is_manual: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Term {
    pub fn status(&self, today: NaiveDate) -> PeriodStatus {
        PeriodStatus::derive(self.is_current, self.start_date, self.end_date, today)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

/// Date window for one of the three terms generated with a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermWindow {
    pub name: TermName,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_name_parsing() {
        assert_eq!("first".parse::<TermName>().unwrap(), TermName::First);
        assert_eq!(" Second ".parse::<TermName>().unwrap(), TermName::Second);
        assert_eq!("3".parse::<TermName>().unwrap(), TermName::Third);
        assert!("fourth".parse::<TermName>().is_err());
    }

    #[test]
    fn test_term_name_ordering_follows_sequence() {
        assert!(TermName::First < TermName::Second);
        assert!(TermName::Second < TermName::Third);
        assert_eq!(TermName::Third.sequence(), 3);
    }

    #[test]
    fn test_term_name_serde() {
        let json = serde_json::to_string(&TermName::Second).unwrap();
        assert_eq!(json, "\"second\"");
    }
}
