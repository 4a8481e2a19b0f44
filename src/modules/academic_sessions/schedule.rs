use chrono::{Datelike, NaiveDate};

use gradeline_models::{TermName, TermWindow};

/// Split a session into its three term windows.
///
/// - first: session start to 31 December of the start year
/// - second: 1 January to 30 April of the following year
/// - third: 1 May of the following year to session end
///
/// Returns `None` if the fixed boundaries do not fit the session, which
/// happens when the session does not run from one calendar year into the
/// next with its end after 1 May.
pub fn term_windows(start: NaiveDate, end: NaiveDate) -> Option<[TermWindow; 3]> {
    let year = start.year();
    let first_end = NaiveDate::from_ymd_opt(year, 12, 31)?;
    let second_start = NaiveDate::from_ymd_opt(year + 1, 1, 1)?;
    let second_end = NaiveDate::from_ymd_opt(year + 1, 4, 30)?;
    let third_start = NaiveDate::from_ymd_opt(year + 1, 5, 1)?;

    if end < third_start {
        return None;
    }

    Some([
        TermWindow {
            name: TermName::First,
            start_date: start,
            end_date: first_end,
        },
        TermWindow {
            name: TermName::Second,
            start_date: second_start,
            end_date: second_end,
        },
        TermWindow {
            name: TermName::Third,
            start_date: third_start,
            end_date: end,
        },
    ])
}
