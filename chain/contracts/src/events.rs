//! Ledger events
//!
//! Immutable records appended by successful operations. A failed
//! operation appends nothing.

use rebase_types::action::CorporateAction;
use rebase_types::ids::Address;
use rebase_types::numeric::Units;
use serde::{Deserialize, Serialize};

/// New shares credited to a holder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minted {
    pub to: Address,
    pub shares: u64,
    pub amount: Units,
}

/// Direct transfer inside the rebasing ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transferred {
    pub from: Address,
    pub to: Address,
    pub amount: Units,
}

/// Corporate action applied to every balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rebased {
    pub action: CorporateAction,
    pub supply_before: Units,
    pub supply_after: Units,
    /// Raw units lost to per-account truncation (always 0 for splits)
    pub rounding_loss: Units,
}

/// Underlying moved into the vault and wrapped tokens minted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wrapped {
    pub owner: Address,
    pub beneficiary: Address,
    pub underlying: Units,
    pub wrapped: Units,
    pub exchange_rate: Units,
}

/// Wrapped tokens burned and underlying released from the vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unwrapped {
    pub holder: Address,
    pub recipient: Address,
    pub wrapped: Units,
    pub underlying: Units,
    pub exchange_rate: Units,
}

/// Transfer inside the wrapper ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedTransferred {
    pub from: Address,
    pub to: Address,
    pub amount: Units,
}

/// Exchange rate recomputed from the vault balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRateUpdated {
    pub previous: Units,
    pub current: Units,
    pub vault_balance: Units,
    pub wrapped_supply: Units,
}

/// Contract-held wrapped tokens claimed by a recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claimed {
    pub contract: Address,
    pub recipient: Address,
    pub requested: Units,
    pub claimed: Units,
    pub underlying: Units,
}

/// Enum wrapper for all ledger events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    Minted(Minted),
    Transferred(Transferred),
    Rebased(Rebased),
    Wrapped(Wrapped),
    Unwrapped(Unwrapped),
    WrappedTransferred(WrappedTransferred),
    ExchangeRateUpdated(ExchangeRateUpdated),
    Claimed(Claimed),
}
