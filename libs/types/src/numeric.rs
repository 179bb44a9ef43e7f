//! Fixed-point units for fractional share quantities
//!
//! One whole share is `SCALE` raw units. Every derived quantity in the
//! ledgers goes through [`mul_div`], which truncates toward zero, so the
//! rounding policy lives in exactly one place.

use ethnum::U256;

use crate::errors::ArithmeticError;

/// Raw ledger units (whole shares × `SCALE`).
pub type Units = u128;

/// Number of fractional decimal digits carried by raw units.
pub const DECIMALS: u32 = 6;

/// Raw units per whole share (10^6).
pub const SCALE: Units = 1_000_000;

/// `floor(x * numerator / denominator)`.
///
/// The product is formed in 256 bits, so it cannot overflow for any
/// `u128` inputs; only the final quotient must fit back in `u128`.
pub fn mul_div(x: Units, numerator: Units, denominator: Units) -> Result<Units, ArithmeticError> {
    if denominator == 0 {
        return Err(ArithmeticError::DivisionByZero);
    }

    let quotient = U256::from(x) * U256::from(numerator) / U256::from(denominator);
    if quotient > U256::from(u128::MAX) {
        return Err(ArithmeticError::Overflow);
    }
    Ok(quotient.as_u128())
}

/// Whole shares to raw units. Cannot overflow: `u64::MAX * 10^6 < u128::MAX`.
pub fn shares_to_units(shares: u64) -> Units {
    Units::from(shares) * SCALE
}

/// Checked balance credit.
pub fn checked_add_units(a: Units, b: Units) -> Result<Units, ArithmeticError> {
    a.checked_add(b).ok_or(ArithmeticError::Overflow)
}

/// Checked balance debit.
pub fn checked_sub_units(a: Units, b: Units) -> Result<Units, ArithmeticError> {
    a.checked_sub(b).ok_or(ArithmeticError::Underflow)
}

/// Checked integer multiple, used by splits.
pub fn checked_mul_units(a: Units, multiplier: Units) -> Result<Units, ArithmeticError> {
    a.checked_mul(multiplier).ok_or(ArithmeticError::Overflow)
}
