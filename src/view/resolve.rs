//! URL segments to view state
//!
//! A calendar URL has up to four positional segments. When the first one is
//! the literal `week` or `weekly` they read as `/week/{week}/{year}/{time}`,
//! otherwise as `/{year}/{month}/{day}/{time}`. Unparseable segments narrow
//! the result instead of failing.

use chrono::{Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::time::decode_time;
use super::week::{date_from_iso_week, iso_week, shift_days};

/// Calendar grid granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Month,
    Week,
    Day,
}

/// What the calendar should display for a URL
///
/// An empty state means the URL carried no usable anchor and the caller
/// should fall back to today's month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub date: Option<NaiveDate>,
    pub view: Option<ViewKind>,
    /// Scroll target as `HH:MM`
    pub time: Option<String>,
}

impl ViewState {
    pub const fn is_empty(&self) -> bool {
        self.date.is_none() && self.view.is_none() && self.time.is_none()
    }

    const fn anchored(date: NaiveDate, view: ViewKind) -> Self {
        Self {
            date: Some(date),
            view: Some(view),
            time: None,
        }
    }
}

/// Resolve URL segments against the local current date
pub fn resolve_view(
    primary: Option<&str>,
    secondary: Option<&str>,
    tertiary: Option<&str>,
    auxiliary: Option<&str>,
) -> ViewState {
    resolve_view_at(
        Local::now().date_naive(),
        primary,
        secondary,
        tertiary,
        auxiliary,
    )
}

/// Resolve URL segments, using `today` wherever the URL means "now"
pub fn resolve_view_at(
    today: NaiveDate,
    primary: Option<&str>,
    secondary: Option<&str>,
    tertiary: Option<&str>,
    auxiliary: Option<&str>,
) -> ViewState {
    let Some(primary) = primary.filter(|p| !p.is_empty()) else {
        return ViewState::default();
    };

    let second = secondary.and_then(parse_int);
    let third = tertiary.and_then(parse_int);
    let mut state = match primary {
        "week" | "weekly" => calculate_week(today, second, third),
        year => calculate_day(parse_int(year), second, third),
    };

    if !state.is_empty() {
        state.time = auxiliary.and_then(decode_time);
    }
    state
}

fn calculate_week(today: NaiveDate, week: Option<i64>, year: Option<i64>) -> ViewState {
    let Some(week) = week else {
        return ViewState::anchored(today, ViewKind::Week);
    };

    let year = match year {
        Some(year) => i32::try_from(year).ok(),
        None => Some(iso_week(today).year),
    };

    // Weeks that cannot be placed on the calendar still open the week view
    let monday = year
        .and_then(|year| date_from_iso_week(year, week))
        .unwrap_or(today);
    ViewState::anchored(monday, ViewKind::Week)
}

fn calculate_day(year: Option<i64>, month: Option<i64>, day: Option<i64>) -> ViewState {
    let Some(year) = year.and_then(|y| i32::try_from(y).ok()) else {
        return ViewState::default();
    };
    let Some(month) = month else {
        return date_view(year, 1, 1, ViewKind::Month);
    };
    let Some(day) = day else {
        return date_view(year, month, 1, ViewKind::Month);
    };
    date_view(year, month, day, ViewKind::Day)
}

fn date_view(year: i32, month: i64, day: i64, view: ViewKind) -> ViewState {
    match normalized_date(year, month, day) {
        Some(date) => ViewState::anchored(date, view),
        None => ViewState::default(),
    }
}

/// Build a date from a 1-based month and day, carrying overflow into the
/// neighbouring months and years (month 13 is next January, day 0 is the
/// last day of the previous month)
fn normalized_date(year: i32, month: i64, day: i64) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let months = month.checked_sub(1)?;
    let amount = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    let first = if months >= 0 {
        jan1.checked_add_months(amount)?
    } else {
        jan1.checked_sub_months(amount)?
    };
    shift_days(first, day.checked_sub(1)?)
}

/// Lenient leading-integer parse: optional whitespace and sign, then digits.
/// Trailing characters are ignored; no digits means no number.
fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -value } else { value })
}
