//! Calendar date normalization for statement cells.

use chrono::{Days, NaiveDate};
use rekon_shared::DateSystem;

/// Parses a textual statement date.
///
/// Only the part before the first space is considered, so time-of-day
/// suffixes are dropped. The remainder must split on `/` or `-` into exactly
/// three numeric tokens: a 4-digit last token means `DD-MM-YYYY`, a 4-digit
/// first token means `YYYY-MM-DD`. Any other shape, or a day that does not
/// exist on the calendar, yields `None`.
///
/// # Examples
///
/// ```
/// use rekon_core::normalize::normalize_date_text;
///
/// let date = normalize_date_text("05/01/2025").unwrap();
/// assert_eq!(date.to_string(), "2025-01-05");
/// assert!(normalize_date_text("not-a-date").is_none());
/// ```
#[must_use]
pub fn normalize_date_text(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.trim().split(' ').next()?;
    let tokens: Vec<&str> = date_part.split(['/', '-']).collect();
    let [first, second, third] = tokens.as_slice() else {
        return None;
    };

    if ![first, second, third]
        .iter()
        .all(|t| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let (year, month, day) = if third.len() == 4 {
        (third, second, first)
    } else if first.len() == 4 {
        (first, second, third)
    } else {
        return None;
    };

    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Converts a spreadsheet date serial to a calendar date.
///
/// The fractional (time-of-day) part is discarded. In the 1900 system serial
/// 60 is the non-existent 1900-02-29 and yields `None`; serials below 60 are
/// shifted by one day to account for it.
#[must_use]
pub fn date_from_serial(serial: f64, system: DateSystem) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let days = serial.trunc() as u64;

    match system {
        DateSystem::Excel1900 => match days {
            0 | 60 => None,
            1..=59 => NaiveDate::from_ymd_opt(1899, 12, 31)?.checked_add_days(Days::new(days)),
            _ => NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(days)),
        },
        DateSystem::Excel1904 => {
            NaiveDate::from_ymd_opt(1904, 1, 1)?.checked_add_days(Days::new(days))
        }
    }
}
