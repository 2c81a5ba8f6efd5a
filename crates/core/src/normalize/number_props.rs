//! Property-based tests for amount cleaning.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::normalize::number::clean_number;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Arbitrary text never panics and never produces a value from nothing.
    #[test]
    fn prop_clean_number_is_total(raw in ".{0,40}") {
        let value = clean_number(&raw);
        if !raw.chars().any(|c| c.is_ascii_digit()) {
            prop_assert_eq!(value, Decimal::ZERO);
        }
    }

    /// Plain integers survive currency decoration unchanged.
    #[test]
    fn prop_decorated_integer_roundtrips(
        amount in 0i64..10_000_000_000,
        prefix in prop_oneof![Just(""), Just("Rp "), Just("IDR "), Just("$")],
    ) {
        let raw = format!("{prefix}{amount}");
        prop_assert_eq!(clean_number(&raw), Decimal::from(amount));
    }

    /// A single comma decimal separator is honoured.
    #[test]
    fn prop_comma_decimal_separator(whole in 0i64..1_000_000, cents in 0u32..100) {
        let raw = format!("{whole},{cents:02}");
        let expected = Decimal::from(whole) + Decimal::new(i64::from(cents), 2);
        prop_assert_eq!(clean_number(&raw), expected);
    }
}
