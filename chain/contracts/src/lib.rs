//! Rebasing equity ledger and its non-rebasing wrapper
//!
//! This crate implements the balance bookkeeping for a rebasing equity
//! token, the wrapper token backed by a vault balance inside it, and the
//! conversions between the two.
//!
//! # Modules
//! - `errors`: Ledger error taxonomy
//! - `events`: Events appended by successful operations
//! - `ledger`: Rebasing ledger (mint, transfer, split, cash dividend)
//! - `wrapper`: Wrapped token ledger and exchange rate
//! - `conversion`: Wrap, unwrap, claim and auto-wrapping transfers
//! - `pair`: Both ledgers under a single lock
//!
//! Corporate actions and exchange-rate refreshes are separate calls: after
//! `apply_corporate_action`, the wrapper keeps converting at its previous
//! rate until `update_exchange_rate` is invoked.

pub mod errors;
pub mod events;
pub mod ledger;
pub mod wrapper;
pub mod conversion;
pub mod pair;

/// Ledger ABI version, frozen after release
pub const LEDGER_ABI_VERSION: &str = "1.0.0";
