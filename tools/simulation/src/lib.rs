//! Scenario runner for the rebasing ledger
//!
//! Drives a [`LedgerPair`](rebase_contracts::pair::LedgerPair) through a
//! mint / auto-wrap / split / dividend / claim lifecycle and captures the
//! holder, vault and contract balances after every step.
//!
//! # Modules
//! - `scenario`: Scenario configuration and runner
//! - `report`: Per-step balance reports and their console rendering

pub mod report;
pub mod scenario;
