//! Corporate actions applied to the rebasing ledger
//!
//! A closed set; consumers match on it exhaustively.

use serde::{Deserialize, Serialize};

use crate::errors::ArithmeticError;
use crate::numeric::{mul_div, Units, SCALE};

/// Cash dividend paid out as additional shares at a reference price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dividend {
    /// Dividend per share, in cents (e.g. $1.50 = 150)
    pub cash_amount_cents: u64,
    /// Reference share price, in cents. Must be positive.
    pub share_price_cents: u64,
}

impl Dividend {
    pub fn new(cash_amount_cents: u64, share_price_cents: u64) -> Self {
        Self {
            cash_amount_cents,
            share_price_cents,
        }
    }

    /// Share-equivalent of the dividend per whole share, in raw units.
    ///
    /// `$1.50 / $50.00 = 0.03` becomes `30_000`.
    pub fn share_ratio(&self) -> Result<Units, ArithmeticError> {
        mul_div(
            SCALE,
            Units::from(self.cash_amount_cents),
            Units::from(self.share_price_cents),
        )
    }
}

/// Corporate action variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorporateAction {
    /// Forward split: every balance is multiplied by `multiplier`.
    Split { multiplier: u64 },
    /// Cash dividend reinvested proportionally as new shares.
    CashDividend(Dividend),
}

impl CorporateAction {
    pub fn split(multiplier: u64) -> Self {
        Self::Split { multiplier }
    }

    pub fn cash_dividend(cash_amount_cents: u64, share_price_cents: u64) -> Self {
        Self::CashDividend(Dividend::new(cash_amount_cents, share_price_cents))
    }

    /// Short label for logs and events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Split { .. } => "split",
            Self::CashDividend(_) => "cash_dividend",
        }
    }
}
