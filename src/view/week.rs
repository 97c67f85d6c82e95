//! ISO-8601 week date arithmetic
//!
//! Weeks start on Monday and week 1 is the week holding the year's first
//! Thursday, so the week-numbering year can differ from the calendar year
//! for dates near January 1st.

use chrono::{Datelike, NaiveDate, TimeDelta};

/// ISO week number paired with its week-numbering year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsoWeek {
    pub week: u32,
    pub year: i32,
}

/// Thursday of the Monday-based week containing `date`
fn thursday_of(date: NaiveDate) -> NaiveDate {
    let from_monday = i64::from(date.weekday().num_days_from_monday());
    shift_days(date, 3 - from_monday).unwrap_or(date)
}

/// Add a signed day count, `None` when the result leaves chrono's range
pub(crate) fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(TimeDelta::try_days(days)?)
}

/// Compute the ISO week and week-numbering year of `date`
pub fn iso_week(date: NaiveDate) -> IsoWeek {
    let thursday = thursday_of(date);
    let year = thursday.year();
    let first_thursday = NaiveDate::from_ymd_opt(year, 1, 4).map_or(thursday, thursday_of);
    let weeks = (thursday - first_thursday).num_days().div_euclid(7);

    IsoWeek {
        week: u32::try_from(weeks + 1).unwrap_or(1),
        year,
    }
}

/// Monday of ISO `week` in week-numbering `year`
///
/// Week numbers outside 1..=53 carry over in 7-day steps from week 1, so
/// week 0 is the last week of the previous year. Returns `None` only when
/// the result is not representable.
pub fn date_from_iso_week(year: i32, week: i64) -> Option<NaiveDate> {
    let jan4 = NaiveDate::from_ymd_opt(year, 1, 4)?;
    let monday = shift_days(jan4, -i64::from(jan4.weekday().num_days_from_monday()))?;
    shift_days(monday, week.checked_sub(1)?.checked_mul(7)?)
}
