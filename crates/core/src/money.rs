//! # Money Module
//!
//! Amounts are `rust_decimal::Decimal` with two fractional digits.
//! The ledger store keeps them as integer cents so SQL can add them exactly.

use crate::error::{CoreError, CoreResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Currency all group amounts are denominated in
pub const CURRENCY_CODE: &str = "KES";

/// Number of fractional digits kept for every amount
pub const MONEY_SCALE: u32 = 2;

/// Largest single amount accepted, in KES. Sums of many such amounts
/// still fit in i64 cents.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Round to cents, midpoint away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate a user-supplied amount and round it to cents.
///
/// Fails with `InvalidAmount` when the amount is not positive, when it
/// becomes zero after rounding (e.g. `0.001`), or when it is above
/// [`MAX_AMOUNT`].
pub fn positive_amount(amount: Decimal, what: &str) -> CoreResult<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(CoreError::InvalidAmount(format!(
            "{} must be greater than 0, got {}",
            what, amount
        )));
    }

    if amount > MAX_AMOUNT {
        return Err(CoreError::InvalidAmount(format!(
            "{} must not exceed {}, got {}",
            what, MAX_AMOUNT, amount
        )));
    }

    let rounded = round_money(amount);
    if rounded <= Decimal::ZERO {
        return Err(CoreError::InvalidAmount(format!(
            "{} rounds to 0.00: {}",
            what, amount
        )));
    }
    Ok(rounded)
}

/// Convert an amount to integer cents
pub fn to_cents(amount: Decimal) -> CoreResult<i64> {
    round_money(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| CoreError::InvalidAmount(format!("Amount out of range: {}", amount)))
}

/// Convert integer cents back to an amount with scale 2
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_SCALE)
}

/// Format for display, e.g. `KES 2080.00`
pub fn format_money(amount: Decimal) -> String {
    format!("{} {:.2}", CURRENCY_CODE, amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(10.004)), dec!(10.00));
        assert_eq!(round_money(dec!(2080)), dec!(2080));
    }

    #[test]
    fn test_positive_amount_rejects_non_positive() {
        assert!(matches!(
            positive_amount(dec!(0), "Contribution"),
            Err(CoreError::InvalidAmount(_))
        ));
        assert!(matches!(
            positive_amount(dec!(-5), "Contribution"),
            Err(CoreError::InvalidAmount(_))
        ));
        assert!(matches!(
            positive_amount(dec!(0.001), "Contribution"),
            Err(CoreError::InvalidAmount(_))
        ));
        assert_eq!(positive_amount(dec!(99.999), "Loan").unwrap(), dec!(100.00));
    }

    #[test]
    fn test_positive_amount_upper_bound() {
        assert_eq!(MAX_AMOUNT, dec!(1000000000000));
        assert_eq!(positive_amount(MAX_AMOUNT, "Loan").unwrap(), MAX_AMOUNT);
        assert!(matches!(
            positive_amount(MAX_AMOUNT + dec!(0.01), "Loan"),
            Err(CoreError::InvalidAmount(_))
        ));
        assert!(matches!(
            positive_amount(Decimal::MAX, "Contribution"),
            Err(CoreError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_to_cents_out_of_range_is_error() {
        assert!(matches!(to_cents(Decimal::MAX), Err(CoreError::InvalidAmount(_))));
        assert!(matches!(
            to_cents(Decimal::from(i64::MAX)),
            Err(CoreError::InvalidAmount(_))
        ));
        assert_eq!(to_cents(MAX_AMOUNT).unwrap(), 100_000_000_000_000);
    }

    #[test]
    fn test_cents_conversion() {
        assert_eq!(to_cents(dec!(2080.00)).unwrap(), 208_000);
        assert_eq!(to_cents(dec!(0.1)).unwrap(), 10);
        assert_eq!(from_cents(208_000), dec!(2080.00));
        assert_eq!(from_cents(-15), dec!(-0.15));
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(2080)), "KES 2080.00");
        assert_eq!(format_money(dec!(12.5)), "KES 12.50");
    }
}
