//! Error types for ledger arithmetic and money parsing
//!
//! Comprehensive error taxonomy using thiserror

use thiserror::Error;

/// Fixed-point arithmetic failures.
///
/// Raised before any ledger mutation; a caller seeing one of these can
/// rely on the ledger state being unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow: result does not fit in 128 bits")]
    Overflow,

    #[error("Arithmetic underflow: result would be negative")]
    Underflow,
}

/// Currency-string parsing failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Empty dollar amount")]
    Empty,

    #[error("Invalid dollar amount: {input}")]
    Malformed { input: String },

    #[error("Negative dollar amount: {input}")]
    Negative { input: String },

    #[error("Dollar amount has fractional cents: {input}")]
    SubCent { input: String },

    #[error("Dollar amount out of range: {input}")]
    OutOfRange { input: String },
}
