//! Corporate-action scenario
//!
//! Replays the lifecycle the wrapper exists for:
//! `mint → auto-wrap to contract → split → refresh rate → dividend → refresh rate → claim`
//!
//! The share price is market data, not ledger state: a split divides it by
//! the multiplier, and the dividend is converted into shares at the
//! post-split price.

use rebase_contracts::conversion::{ClaimReceipt, TransferOutcome};
use rebase_contracts::errors::LedgerError;
use rebase_contracts::pair::{LedgerPair, PairSnapshot};
use rebase_contracts::wrapper::{WrapperConfig, WRAPPED_TICKER_PREFIX};
use rebase_types::action::CorporateAction;
use rebase_types::errors::ArithmeticError;
use rebase_types::ids::Address;
use rebase_types::numeric::shares_to_units;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::report::BalanceReport;

/// Scenario parameters. Defaults reproduce the reference walkthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub ticker: String,
    pub holder: Address,
    pub contract: Address,
    /// Vault address; `None` uses the wrapped ticker
    pub vault: Option<Address>,
    pub initial_shares: u64,
    pub transfer_shares: u64,
    pub share_price_cents: u64,
    pub split_multiplier: u64,
    pub dividend_cents: u64,
    pub claim_shares: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            ticker: "TSLA".to_string(),
            holder: Address::new("0xREECE"),
            contract: Address::new("0xCONTRACT"),
            vault: None,
            initial_shares: 10,
            transfer_shares: 5,
            share_price_cents: 10_000,
            split_multiplier: 2,
            dividend_cents: 150,
            claim_shares: 1,
        }
    }
}

impl ScenarioConfig {
    pub fn wrapper_config(&self) -> WrapperConfig {
        let vault = self
            .vault
            .clone()
            .unwrap_or_else(|| Address::new(format!("{WRAPPED_TICKER_PREFIX}{}", self.ticker)));
        WrapperConfig::new(self.ticker.clone(), vault).with_contract(self.contract.clone())
    }
}

/// Scenario failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("Ledger error during {step}: {source}")]
    Ledger {
        step: &'static str,
        #[source]
        source: LedgerError,
    },

    #[error("Valuation error: {0}")]
    Valuation(#[from] ArithmeticError),

    #[error("Invalid scenario: {0}")]
    InvalidConfig(String),
}

/// Balances captured after one scenario step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: String,
    pub balances: BalanceReport,
    pub totals: PairSnapshot,
}

/// Full scenario outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub config: ScenarioConfig,
    pub transfer: TransferOutcome,
    pub claim: ClaimReceipt,
    pub steps: Vec<StepReport>,
    pub final_totals: PairSnapshot,
}

/// Runs the scenario against a fresh ledger pair.
pub struct ScenarioRunner {
    config: ScenarioConfig,
    pair: LedgerPair,
    share_price_cents: u64,
    steps: Vec<StepReport>,
}

impl ScenarioRunner {
    pub fn new(config: ScenarioConfig) -> Result<Self, ScenarioError> {
        if config.share_price_cents == 0 {
            return Err(ScenarioError::InvalidConfig("share price must be positive".to_string()));
        }
        if config.split_multiplier == 0 {
            return Err(ScenarioError::InvalidConfig("split multiplier must be positive".to_string()));
        }
        if config.share_price_cents / config.split_multiplier == 0 {
            return Err(ScenarioError::InvalidConfig(format!(
                "a {}:1 split takes the {} cent share price to zero",
                config.split_multiplier, config.share_price_cents
            )));
        }
        if config.holder == config.contract {
            return Err(ScenarioError::InvalidConfig(
                "holder and contract must differ".to_string(),
            ));
        }
        let wrapper_config = config.wrapper_config();
        if wrapper_config.vault == config.holder || wrapper_config.vault == config.contract {
            return Err(ScenarioError::InvalidConfig(format!(
                "vault {} must differ from the holder and the contract",
                wrapper_config.vault
            )));
        }

        let pair = LedgerPair::new(wrapper_config)
            .map_err(|source| ScenarioError::Ledger { step: "setup", source })?;
        let share_price_cents = config.share_price_cents;
        Ok(Self {
            config,
            pair,
            share_price_cents,
            steps: Vec::new(),
        })
    }

    pub fn pair(&self) -> &LedgerPair {
        &self.pair
    }

    pub fn run(mut self) -> Result<ScenarioReport, ScenarioError> {
        let holder = self.config.holder.clone();
        let contract = self.config.contract.clone();

        self.pair
            .mint(&holder, self.config.initial_shares)
            .map_err(|source| ScenarioError::Ledger { step: "mint", source })?;
        info!(%holder, shares = self.config.initial_shares, "Minted initial position");
        self.capture("mint")?;

        let amount = shares_to_units(self.config.transfer_shares);
        let transfer = self
            .pair
            .interact(&holder, &contract, amount)
            .map_err(|source| ScenarioError::Ledger { step: "interact", source })?;
        info!(%holder, %contract, amount, ?transfer, "Transferred to contract");
        self.capture("interact")?;

        let multiplier = self.config.split_multiplier;
        self.share_price_cents /= multiplier;
        self.pair
            .apply_corporate_action(CorporateAction::split(multiplier))
            .map_err(|source| ScenarioError::Ledger { step: "split", source })?;
        self.refresh_rate("split")?;
        info!(multiplier, share_price_cents = self.share_price_cents, "Applied stock split");
        self.capture("split")?;

        let dividend = CorporateAction::cash_dividend(self.config.dividend_cents, self.share_price_cents);
        self.pair
            .apply_corporate_action(dividend)
            .map_err(|source| ScenarioError::Ledger { step: "dividend", source })?;
        self.refresh_rate("dividend")?;
        info!(
            dividend_cents = self.config.dividend_cents,
            share_price_cents = self.share_price_cents,
            "Applied cash dividend"
        );
        self.capture("dividend")?;

        let requested = shares_to_units(self.config.claim_shares);
        let claim = self
            .pair
            .claim(&contract, &holder, requested)
            .map_err(|source| ScenarioError::Ledger { step: "claim", source })?;
        info!(
            requested,
            claimed = claim.claimed,
            underlying = claim.underlying,
            clamped = claim.clamped,
            "Claimed from contract"
        );
        self.capture("claim")?;

        Ok(ScenarioReport {
            final_totals: self.pair.snapshot(),
            config: self.config,
            transfer,
            claim,
            steps: self.steps,
        })
    }

    fn refresh_rate(&mut self, step: &'static str) -> Result<(), ScenarioError> {
        self.pair
            .update_exchange_rate()
            .map_err(|source| ScenarioError::Ledger { step, source })?;
        Ok(())
    }

    fn capture(&mut self, step: &str) -> Result<(), ScenarioError> {
        let balances = BalanceReport::capture(
            &self.pair,
            &self.config.holder,
            &self.config.contract,
            self.share_price_cents,
        )?;
        self.steps.push(StepReport {
            step: step.to_string(),
            balances,
            totals: self.pair.snapshot(),
        });
        Ok(())
    }
}

/// Convenience wrapper: build a runner and run it.
pub fn run_scenario(config: ScenarioConfig) -> Result<ScenarioReport, ScenarioError> {
    ScenarioRunner::new(config)?.run()
}
