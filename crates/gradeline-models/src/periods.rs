//! Display status shared by academic sessions and terms.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Read-derived status of a session or term. Only `is_current` is persisted;
/// the rest is computed from the date window on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    Upcoming,
    Active,
    Current,
    Past,
}

impl PeriodStatus {
    /// Derive the status of a period flagged `is_current` spanning `[start, end]`.
    ///
    /// The current flag wins over the date window, so a manually pinned period
    /// reads as `current` even after its end date.
    pub fn derive(is_current: bool, start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Self {
        if is_current {
            Self::Current
        } else if today < start {
            Self::Upcoming
        } else if today > end {
            Self::Past
        } else {
            Self::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Current => "current",
            Self::Past => "past",
        }
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two persisted flags the term state machine reads and writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrentFlags {
    pub is_current: bool,
    pub is_manual: bool,
}

impl CurrentFlags {
    pub const fn new(is_current: bool, is_manual: bool) -> Self {
        Self {
            is_current,
            is_manual,
        }
    }
}

/// An entity paired with its derived [`PeriodStatus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithStatus<T> {
    #[serde(flatten)]
    pub item: T,
    pub status: PeriodStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_derive_status() {
        let start = d(2024, 9, 1);
        let end = d(2024, 12, 31);

        assert_eq!(
            PeriodStatus::derive(false, start, end, d(2024, 8, 31)),
            PeriodStatus::Upcoming
        );
        assert_eq!(
            PeriodStatus::derive(false, start, end, d(2024, 9, 1)),
            PeriodStatus::Active
        );
        assert_eq!(
            PeriodStatus::derive(false, start, end, d(2024, 12, 31)),
            PeriodStatus::Active
        );
        assert_eq!(
            PeriodStatus::derive(false, start, end, d(2025, 1, 1)),
            PeriodStatus::Past
        );
    }

    #[test]
    fn test_current_flag_overrides_window() {
        let start = d(2024, 9, 1);
        let end = d(2024, 12, 31);
        assert_eq!(
            PeriodStatus::derive(true, start, end, d(2025, 6, 1)),
            PeriodStatus::Current
        );
    }
}
