//! Ledger error types
//!
//! Every variant is raised before the first write of the failing
//! operation, so the ledgers are unchanged when a caller sees one.

use rebase_types::errors::ArithmeticError;
use rebase_types::ids::Address;
use rebase_types::numeric::Units;
use thiserror::Error;

/// Errors from the rebasing ledger, the wrapper and the conversions between them
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient {token} balance for {address}: required {required}, available {available}")]
    InsufficientBalance {
        token: String,
        address: Address,
        required: Units,
        available: Units,
    },

    #[error("Arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    #[error("Invalid operation: {reason}")]
    InvalidOperation { reason: String },
}

impl LedgerError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_balance_display() {
        let err = LedgerError::InsufficientBalance {
            token: "TSLA".to_string(),
            address: Address::new("0xREECE"),
            required: 5_000_000,
            available: 1_000_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("TSLA"));
        assert!(msg.contains("0xREECE"));
        assert!(msg.contains("5000000"));
    }

    #[test]
    fn test_ledger_error_from_arithmetic() {
        let err: LedgerError = ArithmeticError::DivisionByZero.into();
        assert_eq!(err, LedgerError::Arithmetic(ArithmeticError::DivisionByZero));
        assert_eq!(err.to_string(), "Arithmetic error: Division by zero");
    }

    #[test]
    fn test_invalid_operation_display() {
        let err = LedgerError::invalid("claim source is not a contract");
        assert_eq!(err.to_string(), "Invalid operation: claim source is not a contract");
    }
}
