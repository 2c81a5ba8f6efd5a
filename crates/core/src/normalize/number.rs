//! Amount cleaning for locale-formatted statement values.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// Cleans a locale-formatted amount into a decimal.
///
/// Keeps only `[0-9,.-]`, turns the first comma into a decimal point, then
/// reads the longest numeric prefix. Empty or unparsable input yields zero,
/// so a zero result may mean either "zero" or "garbage".
///
/// Dots are never treated as thousands separators: `"1.234,56"` becomes
/// `"1.234.56"` and reads as `1.234`. Statements that group thousands with
/// dots are mis-read; this matches how settlement exports have always been
/// imported and must not change silently.
///
/// # Examples
///
/// ```
/// use rekon_core::normalize::clean_number;
/// use rust_decimal::Decimal;
///
/// assert_eq!(clean_number("Rp 150000"), Decimal::from(150_000));
/// assert_eq!(clean_number("12,5"), Decimal::new(125, 1));
/// assert_eq!(clean_number("n/a"), Decimal::ZERO);
/// ```
#[must_use]
pub fn clean_number(raw: &str) -> Decimal {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    let normalized = kept.replacen(',', ".", 1);

    numeric_prefix(&normalized)
        .and_then(|literal| Decimal::from_str(&literal).ok())
        .unwrap_or(Decimal::ZERO)
}

/// Converts a native numeric spreadsheet cell to a decimal.
///
/// Non-finite values become zero.
#[must_use]
pub fn decimal_from_cell_number(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Returns the longest prefix of `s` shaped like `-?digits(.digits)?`.
///
/// A bare sign or a bare dot is not a number.
fn numeric_prefix(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let negative = bytes.first() == Some(&b'-');
    let int_start = usize::from(negative);

    let int_end = int_start
        + bytes[int_start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
    let int_part = &s[int_start..int_end];

    let frac_part = if bytes.get(int_end) == Some(&b'.') {
        let frac_start = int_end + 1;
        let frac_end = frac_start
            + bytes[frac_start..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
        &s[frac_start..frac_end]
    } else {
        ""
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let sign = if negative { "-" } else { "" };
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    if frac_part.is_empty() {
        Some(format!("{sign}{int_part}"))
    } else {
        Some(format!("{sign}{int_part}.{frac_part}"))
    }
}
