//! Time-of-day segment decoding
//!
//! Accepts `H`, `HH`, `H:MM`, `HH:MM` and `HHMM`, each optionally prefixed
//! with `@`. Without a colon the last two digits are the minutes and the
//! rest is the hour, so `"930"` is 09:30 and `"9"` is 00:09.

/// Decode a time segment into canonical zero-padded `HH:MM`
///
/// Returns `None` for anything that is not a valid 24-hour time of day.
pub fn decode_time(input: &str) -> Option<String> {
    let raw = input.strip_prefix('@').unwrap_or(input);

    let (hour, minute) = match raw.split_once(':') {
        Some((hour, minute)) => {
            if !(1..=2).contains(&hour.len()) || minute.len() != 2 {
                return None;
            }
            (hour, minute)
        }
        None => {
            if !(1..=4).contains(&raw.len()) || !is_digits(raw) {
                return None;
            }
            raw.split_at(raw.len().saturating_sub(2))
        }
    };

    if !is_digits(minute) || !(hour.is_empty() || is_digits(hour)) {
        return None;
    }

    let hour: u32 = if hour.is_empty() { 0 } else { hour.parse().ok()? };
    let minute: u32 = minute.parse().ok()?;

    (hour < 24 && minute < 60).then(|| format!("{hour:02}:{minute:02}"))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
