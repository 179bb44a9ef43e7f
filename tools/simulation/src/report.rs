//! Balance reports
//!
//! Point-in-time view of the holder, the vault and the contract, valued at
//! the current share price. Human-readable figures are exact `Decimal`s so
//! the JSON export carries no floating-point drift.

use rebase_contracts::pair::LedgerPair;
use rebase_types::errors::ArithmeticError;
use rebase_types::ids::Address;
use rebase_types::money::{format_cents, format_units, units_to_decimal, value_cents, wrapped_value_cents};
use rebase_types::numeric::Units;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One balance line: raw units plus their market value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub raw: Units,
    pub tokens: Option<Decimal>,
    pub value_cents: Units,
}

impl Holding {
    fn new(raw: Units, value_cents: Units) -> Self {
        Self {
            raw,
            tokens: units_to_decimal(raw),
            value_cents,
        }
    }
}

/// Snapshot of the balances the scenario tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub ticker: String,
    pub wrapped_ticker: String,
    pub share_price_cents: u64,
    pub holder: Holding,
    pub vault: Holding,
    pub contract_wrapped: Holding,
    pub exchange_rate: Units,
}

impl BalanceReport {
    pub fn capture(
        pair: &LedgerPair,
        holder: &Address,
        contract: &Address,
        share_price_cents: u64,
    ) -> Result<Self, ArithmeticError> {
        let ledger = pair.ledger();
        let wrapper = pair.wrapper();
        let rate = wrapper.exchange_rate();

        let holder_raw = ledger.balance_of(holder);
        let vault_raw = ledger.balance_of(wrapper.vault());
        let wrapped_raw = wrapper.balance_of(contract);

        Ok(Self {
            ticker: ledger.ticker().to_string(),
            wrapped_ticker: wrapper.ticker().to_string(),
            share_price_cents,
            holder: Holding::new(holder_raw, value_cents(holder_raw, share_price_cents)?),
            vault: Holding::new(vault_raw, value_cents(vault_raw, share_price_cents)?),
            contract_wrapped: Holding::new(
                wrapped_raw,
                wrapped_value_cents(wrapped_raw, rate, share_price_cents)?,
            ),
            exchange_rate: rate,
        })
    }

    /// Multi-line console rendering.
    pub fn render(&self) -> String {
        [
            format!("Share price: {}", format_cents(Units::from(self.share_price_cents))),
            format!(
                "{} balance: {} tokens ({})",
                self.ticker,
                format_units(self.holder.raw),
                format_cents(self.holder.value_cents)
            ),
            format!(
                "{} balance in wrapper: {} tokens ({})",
                self.ticker,
                format_units(self.vault.raw),
                format_cents(self.vault.value_cents)
            ),
            format!(
                "{} balance of contract: {} tokens ({})",
                self.wrapped_ticker,
                format_units(self.contract_wrapped.raw),
                format_cents(self.contract_wrapped.value_cents)
            ),
            format!("Exchange rate: {}", format_units(self.exchange_rate)),
        ]
        .join("\n")
    }
}
