//! Ledger pair: one rebasing ledger and its wrapper under one lock
//!
//! `wrap`, `unwrap`, `claim` and `update_exchange_rate` read and write both
//! ledgers, so concurrent callers must serialize on a single mutual-exclusion
//! domain covering the pair. [`SharedLedgerPair`] provides that domain;
//! [`LedgerPair`] is the single-threaded form it guards.

use std::sync::{Arc, Mutex};

use rebase_types::action::CorporateAction;
use rebase_types::ids::Address;
use rebase_types::numeric::Units;
use serde::{Deserialize, Serialize};

use crate::conversion::{self, ClaimReceipt, TransferOutcome, UnwrapReceipt, WrapReceipt};
use crate::errors::LedgerError;
use crate::ledger::{RebaseOutcome, RebasingLedger};
use crate::wrapper::{WrappedToken, WrapperConfig};

/// Aggregate figures read from both ledgers at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairSnapshot {
    pub total_supply: Units,
    pub wrapped_supply: Units,
    pub vault_balance: Units,
    pub exchange_rate: Units,
    pub rebase_multiplier: Units,
}

/// A rebasing ledger together with the wrapper backed by it.
#[derive(Debug, Clone)]
pub struct LedgerPair {
    ledger: RebasingLedger,
    wrapper: WrappedToken,
}

impl LedgerPair {
    pub fn new(config: WrapperConfig) -> Result<Self, LedgerError> {
        let ledger = RebasingLedger::new(config.underlying_ticker.clone());
        Ok(Self {
            ledger,
            wrapper: WrappedToken::new(config)?,
        })
    }

    pub fn ledger(&self) -> &RebasingLedger {
        &self.ledger
    }

    pub fn wrapper(&self) -> &WrappedToken {
        &self.wrapper
    }

    pub fn snapshot(&self) -> PairSnapshot {
        PairSnapshot {
            total_supply: self.ledger.total_supply(),
            wrapped_supply: self.wrapper.total_supply(),
            vault_balance: self.ledger.balance_of(self.wrapper.vault()),
            exchange_rate: self.wrapper.exchange_rate(),
            rebase_multiplier: self.ledger.rebase_multiplier(),
        }
    }

    pub fn mint(&mut self, address: &Address, shares: u64) -> Result<Units, LedgerError> {
        self.ledger.mint(address, shares)
    }

    /// Direct transfer in the rebasing ledger. The vault cannot send.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Units) -> Result<(), LedgerError> {
        self.wrapper.ensure_not_vault(from, "transfer")?;
        self.ledger.transfer(from, to, amount)
    }

    pub fn transfer_wrapped(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Units,
    ) -> Result<(), LedgerError> {
        self.wrapper.transfer(from, to, amount)
    }

    /// Apply a corporate action to the rebasing ledger only.
    ///
    /// Leaves the exchange rate stale; follow with [`Self::update_exchange_rate`].
    pub fn apply_corporate_action(
        &mut self,
        action: CorporateAction,
    ) -> Result<RebaseOutcome, LedgerError> {
        self.ledger.apply_corporate_action(action)
    }

    pub fn update_exchange_rate(&mut self) -> Result<Units, LedgerError> {
        self.wrapper.update_exchange_rate(&self.ledger)
    }

    pub fn wrap(&mut self, from: &Address, amount: Units) -> Result<WrapReceipt, LedgerError> {
        conversion::wrap(&mut self.ledger, &mut self.wrapper, from, amount)
    }

    pub fn unwrap(
        &mut self,
        holder: &Address,
        recipient: &Address,
        wrapped_amount: Units,
    ) -> Result<UnwrapReceipt, LedgerError> {
        conversion::unwrap(&mut self.ledger, &mut self.wrapper, holder, recipient, wrapped_amount)
    }

    pub fn claim(
        &mut self,
        contract: &Address,
        recipient: &Address,
        requested: Units,
    ) -> Result<ClaimReceipt, LedgerError> {
        conversion::claim(&mut self.ledger, &mut self.wrapper, contract, recipient, requested)
    }

    pub fn interact(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Units,
    ) -> Result<TransferOutcome, LedgerError> {
        conversion::interact(&mut self.ledger, &mut self.wrapper, from, to, amount)
    }
}

/// Thread-safe handle: every operation holds the pair's lock for its whole
/// duration, so no caller observes one ledger updated without the other.
#[derive(Debug, Clone)]
pub struct SharedLedgerPair {
    inner: Arc<Mutex<LedgerPair>>,
}

impl SharedLedgerPair {
    pub fn new(pair: LedgerPair) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pair)),
        }
    }

    /// Run `f` with exclusive access to both ledgers.
    pub fn with<R>(
        &self,
        f: impl FnOnce(&mut LedgerPair) -> Result<R, LedgerError>,
    ) -> Result<R, LedgerError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| LedgerError::invalid("ledger pair lock poisoned"))?;
        f(&mut *guard)
    }

    pub fn snapshot(&self) -> Result<PairSnapshot, LedgerError> {
        self.with(|pair| Ok(pair.snapshot()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebase_types::numeric::SCALE;

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    fn setup_pair() -> LedgerPair {
        let mut pair =
            LedgerPair::new(WrapperConfig::new("TSLA", "owTSLA").with_contract("0xCONTRACT"))
                .unwrap();
        pair.mint(&addr("alice"), 10).unwrap();
        pair
    }

    #[test]
    fn test_pair_shares_ticker() {
        let pair = setup_pair();
        assert_eq!(pair.ledger().ticker(), "TSLA");
        assert_eq!(pair.wrapper().ticker(), "owTSLA");
    }

    #[test]
    fn test_snapshot_after_wrap_and_split() {
        let mut pair = setup_pair();
        pair.wrap(&addr("alice"), 5_000_000).unwrap();
        pair.apply_corporate_action(CorporateAction::split(2)).unwrap();

        let stale = pair.snapshot();
        assert_eq!(stale.vault_balance, 10_000_000);
        assert_eq!(stale.exchange_rate, SCALE);

        pair.update_exchange_rate().unwrap();
        let fresh = pair.snapshot();
        assert_eq!(fresh.exchange_rate, 2 * SCALE);
        assert_eq!(fresh.total_supply, 20_000_000);
        assert_eq!(fresh.wrapped_supply, 5_000_000);
        assert_eq!(fresh.rebase_multiplier, 2);
    }

    #[test]
    fn test_transfer_wrapped_then_claim() {
        let mut pair = setup_pair();
        pair.wrap(&addr("alice"), 3_000_000).unwrap();
        pair.transfer_wrapped(&addr("alice"), &addr("0xCONTRACT"), 3_000_000).unwrap();
        let receipt = pair.claim(&addr("0xCONTRACT"), &addr("bob"), 1_000_000).unwrap();
        assert_eq!(receipt.underlying, 1_000_000);
        assert_eq!(pair.ledger().balance_of(&addr("bob")), 1_000_000);
    }

    #[test]
    fn test_vault_cannot_send() {
        let mut pair = setup_pair();
        pair.wrap(&addr("alice"), 4_000_000).unwrap();
        pair.transfer_wrapped(&addr("alice"), &addr("owTSLA"), 1_000_000).unwrap();
        let before = pair.snapshot();

        let direct = pair.transfer(&addr("owTSLA"), &addr("bob"), 1_000_000);
        assert!(matches!(direct, Err(LedgerError::InvalidOperation { .. })));
        let wrapped = pair.transfer_wrapped(&addr("owTSLA"), &addr("bob"), 1_000_000);
        assert!(matches!(wrapped, Err(LedgerError::InvalidOperation { .. })));
        let wrap = pair.wrap(&addr("owTSLA"), 1_000_000);
        assert!(matches!(wrap, Err(LedgerError::InvalidOperation { .. })));

        assert_eq!(pair.snapshot(), before);
        assert_eq!(pair.ledger().balance_of(&addr("bob")), 0);
    }

    #[test]
    fn test_new_rejects_vault_registered_as_contract() {
        let config = WrapperConfig::new("TSLA", "owTSLA").with_contract("owTSLA");
        assert!(matches!(
            LedgerPair::new(config),
            Err(LedgerError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn test_shared_pair_with() {
        let shared = SharedLedgerPair::new(setup_pair());
        let other = shared.clone();
        other
            .with(|pair| pair.interact(&addr("alice"), &addr("0xCONTRACT"), 2_000_000))
            .unwrap();
        let snapshot = shared.snapshot().unwrap();
        assert_eq!(snapshot.wrapped_supply, 2_000_000);
        assert_eq!(snapshot.vault_balance, 2_000_000);
    }

    #[test]
    fn test_shared_pair_propagates_errors() {
        let shared = SharedLedgerPair::new(setup_pair());
        let result = shared.with(|pair| pair.transfer(&addr("bob"), &addr("alice"), 1));
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
    }
}
