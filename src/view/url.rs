//! Canonical calendar URLs
//!
//! Builds the path a navigation control should link to for a given date:
//! `/{year}[/{month}][/{day}]/` or `/week/{week}/{year}/`.

use chrono::{Datelike, Months, NaiveDate};

use super::week::{iso_week, shift_days};

/// Formatting and shifting options for [`date_to_url`]
///
/// `include_day` only makes sense together with `include_month`; the
/// combination is not enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlOptions {
    pub include_month: bool,
    pub include_day: bool,
    pub display_week: bool,
    pub days_to_add: i64,
    pub weeks_to_add: i64,
    /// Clamps to the end of a shorter month: Jan 31 + 1 is Feb 29, not Mar 2
    pub months_to_add: i32,
    /// Clamps the same way: Feb 29 + 1 year is Feb 28
    pub years_to_add: i32,
}

impl UrlOptions {
    const PLAIN: Self = Self {
        include_month: false,
        include_day: false,
        display_week: false,
        days_to_add: 0,
        weeks_to_add: 0,
        months_to_add: 0,
        years_to_add: 0,
    };

    /// `/{year}/{month}/`
    pub const fn month() -> Self {
        Self {
            include_month: true,
            ..Self::PLAIN
        }
    }

    /// `/week/{week}/{year}/`
    pub const fn week() -> Self {
        Self {
            display_week: true,
            ..Self::PLAIN
        }
    }

    /// `/{year}/{month}/{day}/`
    pub const fn day() -> Self {
        Self {
            include_month: true,
            include_day: true,
            ..Self::PLAIN
        }
    }
}

/// Build the canonical URL for `date` after applying the shifts in `options`
///
/// A week display (or any week shift) short-circuits the other shifts.
/// Otherwise years, then months, then days are applied. Month and year
/// shifts clamp to the last valid day of the target month. A shift that
/// would leave chrono's date range is skipped.
pub fn date_to_url(date: NaiveDate, options: &UrlOptions) -> String {
    if options.display_week || options.weeks_to_add != 0 {
        let shifted = options
            .weeks_to_add
            .checked_mul(7)
            .and_then(|days| shift_days(date, days))
            .unwrap_or(date);
        let week = iso_week(shifted);
        return format!("/week/{}/{}/", week.week, week.year);
    }

    let mut shifted = date;
    if let Some(months) = options.years_to_add.checked_mul(12) {
        shifted = shift_months(shifted, months);
    }
    shifted = shift_months(shifted, options.months_to_add);
    shifted = shift_days(shifted, options.days_to_add).unwrap_or(shifted);

    let mut url = format!("/{}/", shifted.year());
    if options.include_month {
        url.push_str(&format!("{:02}/", shifted.month()));
    }
    if options.include_day {
        url.push_str(&format!("{:02}/", shifted.day()));
    }
    url
}

fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let amount = Months::new(months.unsigned_abs());
    let shifted = if months >= 0 {
        date.checked_add_months(amount)
    } else {
        date.checked_sub_months(amount)
    };
    shifted.unwrap_or(date)
}
