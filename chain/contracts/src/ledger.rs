//! Rebasing ledger: the primary equity token
//!
//! Holds per-address balances in raw fixed-point units and applies the
//! corporate actions that rebase them:
//! - Mint of whole shares
//! - Direct transfers
//! - Stock split (exact multiple of every balance)
//! - Cash dividend (proportional share award, truncated per account)
//!
//! `total_supply` always equals the sum of balances. Dividend truncation
//! remainders leave both the balances and the supply; the amount lost is
//! reported in [`RebaseOutcome::rounding_loss`].

use std::collections::BTreeMap;

use rebase_types::action::{CorporateAction, Dividend};
use rebase_types::ids::Address;
use rebase_types::numeric::{
    checked_add_units, checked_mul_units, checked_sub_units, mul_div, shares_to_units, Units,
    SCALE,
};
use tracing::{debug, info};

use crate::errors::LedgerError;
use crate::events::{LedgerEvent, Minted, Rebased, Transferred};

/// Result of a corporate action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebaseOutcome {
    pub supply_before: Units,
    pub supply_after: Units,
    /// Dividend share ratio in raw units per whole share (`None` for splits)
    pub share_ratio: Option<Units>,
    /// Units that an exact distribution would have awarded but per-account
    /// truncation did not. Strictly less than the number of holders.
    pub rounding_loss: Units,
}

/// A validated two-sided balance change, applied without further checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BalanceMove {
    from: Address,
    to: Address,
    from_after: Units,
    to_after: Units,
}

/// Rebasing token ledger.
#[derive(Debug, Clone)]
pub struct RebasingLedger {
    ticker: String,
    total_supply: Units,
    balances: BTreeMap<Address, Units>,
    /// Cumulative product of every split applied, saturating
    rebase_multiplier: Units,
    last_split: Option<u64>,
    events: Vec<LedgerEvent>,
}

impl RebasingLedger {
    /// Create an empty ledger with zero supply.
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            total_supply: 0,
            balances: BTreeMap::new(),
            rebase_multiplier: 1,
            last_split: None,
            events: Vec::new(),
        }
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn total_supply(&self) -> Units {
        self.total_supply
    }

    /// Balance of an address; absent entries read as zero.
    pub fn balance_of(&self, address: &Address) -> Units {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// All balance entries, in address order.
    pub fn balances(&self) -> impl Iterator<Item = (&Address, Units)> {
        self.balances.iter().map(|(addr, bal)| (addr, *bal))
    }

    /// Number of balance entries (including zero balances that were once credited).
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Sum of every balance; `None` if it does not fit in `Units`.
    pub fn sum_of_balances(&self) -> Option<Units> {
        self.balances
            .values()
            .try_fold(0 as Units, |acc, bal| acc.checked_add(*bal))
    }

    /// Cumulative split factor since creation (1 when no split was applied).
    /// Saturates at `Units::MAX`.
    pub fn rebase_multiplier(&self) -> Units {
        self.rebase_multiplier
    }

    /// Multiplier of the most recent split.
    pub fn last_split(&self) -> Option<u64> {
        self.last_split
    }

    // ───────────────────────── Mint ─────────────────────────

    /// Credit `shares` whole shares to `address`. Returns the raw units minted.
    pub fn mint(&mut self, address: &Address, shares: u64) -> Result<Units, LedgerError> {
        let amount = shares_to_units(shares);
        if amount == 0 {
            return Ok(0);
        }

        let balance_after = checked_add_units(self.balance_of(address), amount)?;
        let supply_after = checked_add_units(self.total_supply, amount)?;

        self.balances.insert(address.clone(), balance_after);
        self.total_supply = supply_after;

        debug!(ticker = %self.ticker, to = %address, amount, "Minted shares");
        self.events.push(LedgerEvent::Minted(Minted {
            to: address.clone(),
            shares,
            amount,
        }));
        Ok(amount)
    }

    // ───────────────────────── Transfer ─────────────────────────

    /// Move `amount` raw units from `from` to `to`.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Units) -> Result<(), LedgerError> {
        let plan = self.plan_move(from, to, amount)?;
        self.apply_move(plan);

        debug!(ticker = %self.ticker, %from, %to, amount, "Transferred");
        self.events.push(LedgerEvent::Transferred(Transferred {
            from: from.clone(),
            to: to.clone(),
            amount,
        }));
        Ok(())
    }

    /// Validate a transfer and compute both resulting balances.
    pub(crate) fn plan_move(
        &self,
        from: &Address,
        to: &Address,
        amount: Units,
    ) -> Result<BalanceMove, LedgerError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                token: self.ticker.clone(),
                address: from.clone(),
                required: amount,
                available,
            });
        }

        let (from_after, to_after) = if from == to {
            (available, available)
        } else {
            (
                checked_sub_units(available, amount)?,
                checked_add_units(self.balance_of(to), amount)?,
            )
        };

        Ok(BalanceMove {
            from: from.clone(),
            to: to.clone(),
            from_after,
            to_after,
        })
    }

    pub(crate) fn apply_move(&mut self, plan: BalanceMove) {
        self.balances.insert(plan.from, plan.from_after);
        self.balances.insert(plan.to, plan.to_after);
    }

    // ───────────────────────── Corporate actions ─────────────────────────

    /// Apply a split or cash dividend to every balance.
    ///
    /// The wrapper's exchange rate is NOT refreshed here; callers holding a
    /// [`WrappedToken`](crate::wrapper::WrappedToken) must follow up with
    /// `update_exchange_rate`, or wraps and unwraps keep using the stale rate.
    pub fn apply_corporate_action(
        &mut self,
        action: CorporateAction,
    ) -> Result<RebaseOutcome, LedgerError> {
        let outcome = match action {
            CorporateAction::Split { multiplier } => self.apply_split(multiplier)?,
            CorporateAction::CashDividend(dividend) => self.apply_dividend(&dividend)?,
        };

        info!(
            ticker = %self.ticker,
            kind = action.kind(),
            supply_before = outcome.supply_before,
            supply_after = outcome.supply_after,
            rounding_loss = outcome.rounding_loss,
            "Applied corporate action"
        );
        self.events.push(LedgerEvent::Rebased(Rebased {
            action,
            supply_before: outcome.supply_before,
            supply_after: outcome.supply_after,
            rounding_loss: outcome.rounding_loss,
        }));
        Ok(outcome)
    }

    fn apply_split(&mut self, multiplier: u64) -> Result<RebaseOutcome, LedgerError> {
        if multiplier == 0 {
            return Err(LedgerError::invalid("split multiplier must be positive"));
        }
        let factor = Units::from(multiplier);

        let updated = self
            .balances
            .iter()
            .map(|(addr, bal)| Ok((addr.clone(), checked_mul_units(*bal, factor)?)))
            .collect::<Result<Vec<_>, LedgerError>>()?;
        let supply_after = checked_mul_units(self.total_supply, factor)?;
        // Informational counter: saturates rather than failing a valid split
        let multiplier_after = self.rebase_multiplier.saturating_mul(factor);

        let supply_before = self.total_supply;
        self.balances.extend(updated);
        self.total_supply = supply_after;
        self.rebase_multiplier = multiplier_after;
        self.last_split = Some(multiplier);

        Ok(RebaseOutcome {
            supply_before,
            supply_after,
            share_ratio: None,
            rounding_loss: 0,
        })
    }

    fn apply_dividend(&mut self, dividend: &Dividend) -> Result<RebaseOutcome, LedgerError> {
        let share_ratio = dividend.share_ratio()?;

        let mut distributed: Units = 0;
        let mut updated = Vec::with_capacity(self.balances.len());
        for (addr, bal) in &self.balances {
            let award = mul_div(*bal, share_ratio, SCALE)?;
            distributed = checked_add_units(distributed, award)?;
            updated.push((addr.clone(), checked_add_units(*bal, award)?));
        }

        let exact = mul_div(self.total_supply, share_ratio, SCALE)?;
        let supply_after = checked_add_units(self.total_supply, distributed)?;

        let supply_before = self.total_supply;
        self.balances.extend(updated);
        self.total_supply = supply_after;

        Ok(RebaseOutcome {
            supply_before,
            supply_after,
            share_ratio: Some(share_ratio),
            rounding_loss: exact.saturating_sub(distributed),
        })
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
