//! School-local calendar.
//!
//! Term and session transitions compare dates, not instants, so "today" has to
//! be taken in the school's time zone. The offset is fixed; schools in zones
//! with daylight saving set it to their current offset.
//!
//! # Environment Variables
//!
//! - `SCHOOL_UTC_OFFSET_MINUTES`: Offset from UTC in minutes (default: `0`,
//!   e.g. `60` for West Africa Time)

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use std::env;

/// Fourteen hours either side of UTC.
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CalendarConfig {
    pub utc_offset_minutes: i32,
}

impl CalendarConfig {
    pub fn from_env() -> Self {
        let utc_offset_minutes = env::var("SCHOOL_UTC_OFFSET_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .map(|m| m.clamp(-MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES))
            .unwrap_or(0);

        Self { utc_offset_minutes }
    }

    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or(Utc.fix())
    }

    /// The school-local date at `now`.
    pub fn date_at(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset()).date_naive()
    }

    /// The school-local date right now.
    pub fn today(&self) -> NaiveDate {
        self.date_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_at_applies_offset() {
        let late_evening_utc = Utc.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap();

        let utc = CalendarConfig::default();
        assert_eq!(
            utc.date_at(late_evening_utc),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );

        let lagos = CalendarConfig {
            utc_offset_minutes: 60,
        };
        assert_eq!(
            lagos.date_at(late_evening_utc),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
    }
}
