//! Currency and unit adapters
//!
//! Conversions between ledger integers and human-readable strings. Parsing
//! goes through `rust_decimal` so "$1.15" is exactly 115 cents; malformed
//! input is an error, never a silent zero.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::errors::{ArithmeticError, MoneyError};
use crate::numeric::{checked_mul_units, mul_div, Units, DECIMALS, SCALE};

/// Parse a dollar string into cents.
///
/// Accepts surrounding whitespace, one leading `$` and thousands
/// separators: `" $1,234.50 "` is `123_450`.
pub fn parse_cents(input: &str) -> Result<u64, MoneyError> {
    let trimmed = input.trim();
    let unsigned = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let cleaned: String = unsigned.chars().filter(|c| *c != ',').collect();

    if cleaned.is_empty() {
        return Err(MoneyError::Empty);
    }

    let dollars = Decimal::from_str_exact(&cleaned).map_err(|_| MoneyError::Malformed {
        input: input.to_string(),
    })?;

    if dollars.is_sign_negative() && !dollars.is_zero() {
        return Err(MoneyError::Negative {
            input: input.to_string(),
        });
    }

    let cents = dollars
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| MoneyError::OutOfRange {
            input: input.to_string(),
        })?;

    if !cents.fract().is_zero() {
        return Err(MoneyError::SubCent {
            input: input.to_string(),
        });
    }

    cents.trunc().to_u64().ok_or_else(|| MoneyError::OutOfRange {
        input: input.to_string(),
    })
}

/// `$D.CC`
pub fn format_cents(cents: Units) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// Raw units with all six fractional digits: `10_300_000` is `"10.300000"`.
pub fn format_units(raw: Units) -> String {
    format!("{}.{:06}", raw / SCALE, raw % SCALE)
}

/// Raw units as an exact `Decimal` with six fractional digits.
///
/// `None` when the value exceeds the 96-bit `Decimal` mantissa.
pub fn units_to_decimal(raw: Units) -> Option<Decimal> {
    let signed = i128::try_from(raw).ok()?;
    Decimal::try_from_i128_with_scale(signed, DECIMALS).ok()
}

/// Market value in cents of `units` at `share_price_cents`, truncated.
pub fn value_cents(units: Units, share_price_cents: u64) -> Result<Units, ArithmeticError> {
    mul_div(units, Units::from(share_price_cents), SCALE)
}

/// Market value in cents of a wrapped balance: converted to underlying at
/// `exchange_rate`, then priced, with a single truncation at the end.
pub fn wrapped_value_cents(
    wrapped: Units,
    exchange_rate: Units,
    share_price_cents: u64,
) -> Result<Units, ArithmeticError> {
    let numerator = checked_mul_units(Units::from(share_price_cents), exchange_rate)?;
    mul_div(wrapped, numerator, SCALE * SCALE)
}
