//! Calendar view resolution
//!
//! Maps bookmarkable calendar URLs such as `/2024/03/15/@9:30` or
//! `/week/2/2024/` to the view the client should show, and dates back to
//! those URLs. Everything here is pure and never fails: bad input narrows
//! the result.

mod navigation;
mod resolve;
mod time;
mod url;
mod week;

pub use navigation::{navigation_links, visible_range, NavLinks};
pub use resolve::{resolve_view, resolve_view_at, ViewKind, ViewState};
pub use time::decode_time;
pub use url::{date_to_url, UrlOptions};
pub use week::{date_from_iso_week, iso_week, IsoWeek};
