//! Wrapped token: non-rebasing claim on a vault balance
//!
//! Wrapped balances never change on a split or dividend. Instead the vault's
//! underlying balance in the [`RebasingLedger`] grows, and the exchange rate
//! (underlying units per `SCALE` wrapped units) is recomputed from it on
//! demand by [`WrappedToken::update_exchange_rate`].
//!
//! The vault address and the set of contract addresses that receive
//! auto-wrapped transfers are explicit configuration, never inferred from
//! the shape of an address string.

use std::collections::{BTreeMap, BTreeSet};

use rebase_types::ids::Address;
use rebase_types::numeric::{checked_add_units, checked_sub_units, mul_div, Units, SCALE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::LedgerError;
use crate::events::{ExchangeRateUpdated, LedgerEvent, WrappedTransferred};
use crate::ledger::RebasingLedger;

/// Prefix of the wrapped ticker (`TSLA` → `owTSLA`).
pub const WRAPPED_TICKER_PREFIX: &str = "ow";

/// Wrapper configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapperConfig {
    /// Ticker of the rebasing token being wrapped
    pub underlying_ticker: String,
    /// Address inside the rebasing ledger that holds the backing collateral
    pub vault: Address,
    /// Recipients whose incoming transfers are auto-wrapped, and whose
    /// wrapped balances may be claimed
    pub contracts: BTreeSet<Address>,
}

impl WrapperConfig {
    pub fn new(underlying_ticker: impl Into<String>, vault: impl Into<Address>) -> Self {
        Self {
            underlying_ticker: underlying_ticker.into(),
            vault: vault.into(),
            contracts: BTreeSet::new(),
        }
    }

    pub fn with_contract(mut self, contract: impl Into<Address>) -> Self {
        self.contracts.insert(contract.into());
        self
    }

    pub fn wrapped_ticker(&self) -> String {
        format!("{WRAPPED_TICKER_PREFIX}{}", self.underlying_ticker)
    }

    /// The vault holds collateral only; it can never double as a contract.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.contracts.contains(&self.vault) {
            return Err(LedgerError::invalid(format!(
                "vault {} cannot be registered as a contract",
                self.vault
            )));
        }
        Ok(())
    }
}

/// A validated mint or burn, applied without further checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SupplyChange {
    holder: Address,
    balance_after: Units,
    supply_after: Units,
}

/// Non-rebasing wrapper ledger.
#[derive(Debug, Clone)]
pub struct WrappedToken {
    config: WrapperConfig,
    ticker: String,
    total_supply: Units,
    balances: BTreeMap<Address, Units>,
    /// Underlying units per `SCALE` wrapped units; always positive
    exchange_rate: Units,
    events: Vec<LedgerEvent>,
}

impl WrappedToken {
    /// Create an empty wrapper at a 1:1 exchange rate.
    pub fn new(config: WrapperConfig) -> Result<Self, LedgerError> {
        config.validate()?;
        let ticker = config.wrapped_ticker();
        Ok(Self {
            config,
            ticker,
            total_supply: 0,
            balances: BTreeMap::new(),
            exchange_rate: SCALE,
            events: Vec::new(),
        })
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn config(&self) -> &WrapperConfig {
        &self.config
    }

    pub fn vault(&self) -> &Address {
        &self.config.vault
    }

    /// Whether transfers to `address` are auto-wrapped.
    pub fn is_contract(&self, address: &Address) -> bool {
        self.config.contracts.contains(address)
    }

    /// Register another auto-wrap recipient.
    pub fn register_contract(&mut self, contract: impl Into<Address>) -> Result<(), LedgerError> {
        let contract = contract.into();
        if contract == self.config.vault {
            return Err(LedgerError::invalid(format!(
                "vault {contract} cannot be registered as a contract"
            )));
        }
        self.config.contracts.insert(contract);
        Ok(())
    }

    /// Reject `address` as the debited side of `operation` when it is the vault.
    ///
    /// Vault collateral leaves only through unwrap and claim.
    pub(crate) fn ensure_not_vault(&self, address: &Address, operation: &str) -> Result<(), LedgerError> {
        if address == &self.config.vault {
            return Err(LedgerError::invalid(format!(
                "vault {address} cannot be the source of a {operation}"
            )));
        }
        Ok(())
    }

    pub fn total_supply(&self) -> Units {
        self.total_supply
    }

    pub fn balance_of(&self, address: &Address) -> Units {
        self.balances.get(address).copied().unwrap_or(0)
    }

    pub fn balances(&self) -> impl Iterator<Item = (&Address, Units)> {
        self.balances.iter().map(|(addr, bal)| (addr, *bal))
    }

    pub fn exchange_rate(&self) -> Units {
        self.exchange_rate
    }

    // ───────────────────────── Conversion quotes ─────────────────────────

    /// Wrapped units minted for `underlying` at the current rate.
    pub fn to_wrapped(&self, underlying: Units) -> Result<Units, LedgerError> {
        Ok(mul_div(underlying, SCALE, self.exchange_rate)?)
    }

    /// Underlying units released for `wrapped` at the current rate.
    pub fn to_underlying(&self, wrapped: Units) -> Result<Units, LedgerError> {
        Ok(mul_div(wrapped, self.exchange_rate, SCALE)?)
    }

    // ───────────────────────── Exchange rate ─────────────────────────

    /// Recompute the exchange rate from the vault's underlying balance.
    ///
    /// Must be called after every corporate action on `ledger`; until then
    /// conversions use the previous rate. With no wrapped supply outstanding
    /// the rate is left as is. Returns the rate in effect afterwards.
    pub fn update_exchange_rate(&mut self, ledger: &RebasingLedger) -> Result<Units, LedgerError> {
        if self.total_supply == 0 {
            return Ok(self.exchange_rate);
        }

        let vault_balance = ledger.balance_of(&self.config.vault);
        let current = mul_div(vault_balance, SCALE, self.total_supply)?;
        if current == 0 {
            return Err(LedgerError::invalid(format!(
                "vault balance {vault_balance} cannot back wrapped supply {}",
                self.total_supply
            )));
        }

        let previous = self.exchange_rate;
        self.exchange_rate = current;

        info!(
            ticker = %self.ticker,
            previous,
            current,
            vault_balance,
            "Updated exchange rate"
        );
        self.events.push(LedgerEvent::ExchangeRateUpdated(ExchangeRateUpdated {
            previous,
            current,
            vault_balance,
            wrapped_supply: self.total_supply,
        }));
        Ok(current)
    }

    // ───────────────────────── Transfer ─────────────────────────

    /// Move wrapped units between holders.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Units) -> Result<(), LedgerError> {
        self.ensure_not_vault(from, "wrapped transfer")?;
        let available = self.balance_of(from);
        if available < amount {
            return Err(self.insufficient(from, amount, available));
        }

        if from != to {
            let from_after = checked_sub_units(available, amount)?;
            let to_after = checked_add_units(self.balance_of(to), amount)?;
            self.balances.insert(from.clone(), from_after);
            self.balances.insert(to.clone(), to_after);
        }

        debug!(ticker = %self.ticker, %from, %to, amount, "Transferred wrapped");
        self.events.push(LedgerEvent::WrappedTransferred(WrappedTransferred {
            from: from.clone(),
            to: to.clone(),
            amount,
        }));
        Ok(())
    }

    // ───────────────────────── Mint / burn (conversion engine only) ─────────────────────────

    pub(crate) fn plan_mint(&self, holder: &Address, amount: Units) -> Result<SupplyChange, LedgerError> {
        Ok(SupplyChange {
            holder: holder.clone(),
            balance_after: checked_add_units(self.balance_of(holder), amount)?,
            supply_after: checked_add_units(self.total_supply, amount)?,
        })
    }

    pub(crate) fn plan_burn(&self, holder: &Address, amount: Units) -> Result<SupplyChange, LedgerError> {
        let available = self.balance_of(holder);
        if available < amount {
            return Err(self.insufficient(holder, amount, available));
        }
        Ok(SupplyChange {
            holder: holder.clone(),
            balance_after: checked_sub_units(available, amount)?,
            supply_after: checked_sub_units(self.total_supply, amount)?,
        })
    }

    pub(crate) fn apply_supply_change(&mut self, change: SupplyChange) {
        self.balances.insert(change.holder, change.balance_after);
        self.total_supply = change.supply_after;
    }

    pub(crate) fn record(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    fn insufficient(&self, address: &Address, required: Units, available: Units) -> LedgerError {
        LedgerError::InsufficientBalance {
            token: self.ticker.clone(),
            address: address.clone(),
            required,
            available,
        }
    }

    // ───────────────────────── Events ─────────────────────────

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }
}
