//! Header navigation links
//!
//! The URLs behind the client's today/prev/next and month/week/day
//! buttons for a calendar currently showing `anchor` in a given view.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::resolve::ViewKind;
use super::url::{date_to_url, UrlOptions};
use super::week::shift_days;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLinks {
    pub today: String,
    pub prev: String,
    pub next: String,
    pub month: String,
    pub week: String,
    pub day: String,
}

pub fn navigation_links(view: ViewKind, anchor: NaiveDate, today: NaiveDate) -> NavLinks {
    let base = match view {
        ViewKind::Month => UrlOptions::month(),
        ViewKind::Week => UrlOptions::week(),
        ViewKind::Day => UrlOptions::day(),
    };
    let step = |delta: i32| match view {
        ViewKind::Month => UrlOptions {
            months_to_add: delta,
            ..base
        },
        ViewKind::Week => UrlOptions {
            weeks_to_add: i64::from(delta),
            ..base
        },
        ViewKind::Day => UrlOptions {
            days_to_add: i64::from(delta),
            ..base
        },
    };

    let today_visible = is_visible(view, anchor, today);
    let week_target = if today_visible { today } else { anchor };
    let day_target = if view == ViewKind::Month && today_visible {
        today
    } else {
        anchor
    };

    NavLinks {
        today: date_to_url(today, &base),
        prev: date_to_url(anchor, &step(-1)),
        next: date_to_url(anchor, &step(1)),
        month: date_to_url(anchor, &UrlOptions::month()),
        week: date_to_url(week_target, &UrlOptions::week()),
        day: date_to_url(day_target, &UrlOptions::day()),
    }
}

fn is_visible(view: ViewKind, anchor: NaiveDate, date: NaiveDate) -> bool {
    let (first, last) = visible_range(view, anchor);
    (first..=last).contains(&date)
}

/// First and last day of the range a `view` anchored at `anchor` shows
pub fn visible_range(view: ViewKind, anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
    match view {
        ViewKind::Month => {
            let first = anchor.with_day(1).unwrap_or(anchor);
            let last = first
                .checked_add_months(chrono::Months::new(1))
                .and_then(|end| end.pred_opt())
                .unwrap_or(anchor);
            (first, last)
        }
        ViewKind::Week => {
            let from_monday = i64::from(anchor.weekday().num_days_from_monday());
            let monday = shift_days(anchor, -from_monday).unwrap_or(anchor);
            (monday, shift_days(monday, 6).unwrap_or(anchor))
        }
        ViewKind::Day => (anchor, anchor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_links() {
        let links = navigation_links(ViewKind::Month, date(2024, 1, 31), date(2026, 10, 18));
        assert_eq!(links.today, "/2026/10/");
        assert_eq!(links.prev, "/2023/12/");
        assert_eq!(links.next, "/2024/02/");
        assert_eq!(links.month, "/2024/01/");
        assert_eq!(links.week, "/week/5/2024/");
        assert_eq!(links.day, "/2024/01/31/");
    }

    #[test]
    fn test_month_links_prefer_today_when_visible() {
        let links = navigation_links(ViewKind::Month, date(2026, 10, 1), date(2026, 10, 18));
        assert_eq!(links.week, "/week/42/2026/");
        assert_eq!(links.day, "/2026/10/18/");
    }

    #[test]
    fn test_week_links() {
        let links = navigation_links(ViewKind::Week, date(2024, 12, 30), date(2026, 10, 18));
        assert_eq!(links.today, "/week/42/2026/");
        assert_eq!(links.prev, "/week/52/2024/");
        assert_eq!(links.next, "/week/2/2025/");
        assert_eq!(links.month, "/2024/12/");
        assert_eq!(links.day, "/2024/12/30/");
    }

    #[test]
    fn test_week_view_day_link_stays_on_anchor() {
        let links = navigation_links(ViewKind::Week, date(2026, 10, 12), date(2026, 10, 18));
        assert_eq!(links.week, "/week/42/2026/");
        assert_eq!(links.day, "/2026/10/12/");
    }

    #[test]
    fn test_day_links() {
        let links = navigation_links(ViewKind::Day, date(2024, 12, 31), date(2026, 10, 18));
        assert_eq!(links.today, "/2026/10/18/");
        assert_eq!(links.prev, "/2024/12/30/");
        assert_eq!(links.next, "/2025/01/01/");
        assert_eq!(links.week, "/week/1/2025/");
    }

    #[test]
    fn test_visible_range() {
        assert_eq!(
            visible_range(ViewKind::Month, date(2024, 2, 10)),
            (date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(
            visible_range(ViewKind::Week, date(2024, 12, 31)),
            (date(2024, 12, 30), date(2025, 1, 5))
        );
        assert_eq!(
            visible_range(ViewKind::Day, date(2024, 12, 31)),
            (date(2024, 12, 31), date(2024, 12, 31))
        );
    }
}
