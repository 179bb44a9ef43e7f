//! Conversion engine: moves value between the rebasing ledger and its wrapper
//!
//! - `wrap`: underlying into the vault, wrapped tokens minted at the current rate
//! - `unwrap`: wrapped tokens burned, underlying released from the vault
//! - `claim`: unwrap a contract's wrapped balance to a recipient, clamped to what it holds
//! - `interact`: transfer that auto-wraps when the recipient is a registered contract
//!
//! Each operation validates and plans every balance change on both ledgers
//! before writing any of them, so a failure leaves both untouched.

use rebase_types::ids::Address;
use rebase_types::numeric::Units;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::LedgerError;
use crate::events::{Claimed, LedgerEvent, Unwrapped, Wrapped};
use crate::ledger::RebasingLedger;
use crate::wrapper::WrappedToken;

/// Amounts moved by a wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapReceipt {
    pub underlying: Units,
    pub wrapped: Units,
}

/// Amounts moved by an unwrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnwrapReceipt {
    pub wrapped: Units,
    pub underlying: Units,
}

/// Result of a claim, including whether the request was clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub requested: Units,
    pub claimed: Units,
    pub underlying: Units,
    pub clamped: bool,
}

/// How `interact` delivered a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferOutcome {
    /// Plain transfer inside the rebasing ledger
    Direct { amount: Units },
    /// Recipient is a contract: underlying wrapped, wrapped units delivered
    AutoWrapped(WrapReceipt),
}

/// Wrap `amount` underlying units held by `from`, crediting the wrapped
/// units to `from`.
pub fn wrap(
    ledger: &mut RebasingLedger,
    wrapper: &mut WrappedToken,
    from: &Address,
    amount: Units,
) -> Result<WrapReceipt, LedgerError> {
    wrap_into(ledger, wrapper, from, from, amount)
}

/// Wrap `amount` underlying units held by `owner`, crediting the wrapped
/// units to `beneficiary`.
fn wrap_into(
    ledger: &mut RebasingLedger,
    wrapper: &mut WrappedToken,
    owner: &Address,
    beneficiary: &Address,
    amount: Units,
) -> Result<WrapReceipt, LedgerError> {
    wrapper.ensure_not_vault(owner, "wrap")?;

    let wrapped = wrapper.to_wrapped(amount)?;
    if amount > 0 && wrapped == 0 {
        return Err(LedgerError::invalid(format!(
            "wrapping {amount} units yields no wrapped units at rate {}",
            wrapper.exchange_rate()
        )));
    }

    let deposit = ledger.plan_move(owner, wrapper.vault(), amount)?;
    let mint = wrapper.plan_mint(beneficiary, wrapped)?;

    ledger.apply_move(deposit);
    wrapper.apply_supply_change(mint);

    let exchange_rate = wrapper.exchange_rate();
    debug!(%owner, %beneficiary, underlying = amount, wrapped, exchange_rate, "Wrapped");
    wrapper.record(LedgerEvent::Wrapped(Wrapped {
        owner: owner.clone(),
        beneficiary: beneficiary.clone(),
        underlying: amount,
        wrapped,
        exchange_rate,
    }));

    Ok(WrapReceipt {
        underlying: amount,
        wrapped,
    })
}

/// Burn `wrapped_amount` from `holder` and release the underlying it is
/// worth at the current rate from the vault to `recipient`.
pub fn unwrap(
    ledger: &mut RebasingLedger,
    wrapper: &mut WrappedToken,
    holder: &Address,
    recipient: &Address,
    wrapped_amount: Units,
) -> Result<UnwrapReceipt, LedgerError> {
    let underlying = wrapper.to_underlying(wrapped_amount)?;

    let burn = wrapper.plan_burn(holder, wrapped_amount)?;
    let release = ledger.plan_move(wrapper.vault(), recipient, underlying)?;

    wrapper.apply_supply_change(burn);
    ledger.apply_move(release);

    let exchange_rate = wrapper.exchange_rate();
    debug!(%holder, %recipient, wrapped = wrapped_amount, underlying, exchange_rate, "Unwrapped");
    wrapper.record(LedgerEvent::Unwrapped(Unwrapped {
        holder: holder.clone(),
        recipient: recipient.clone(),
        wrapped: wrapped_amount,
        underlying,
        exchange_rate,
    }));

    Ok(UnwrapReceipt {
        wrapped: wrapped_amount,
        underlying,
    })
}

/// Unwrap wrapped units held by a registered contract directly to `recipient`.
///
/// Requests above the contract's wrapped balance are clamped to that
/// balance rather than rejected.
pub fn claim(
    ledger: &mut RebasingLedger,
    wrapper: &mut WrappedToken,
    contract: &Address,
    recipient: &Address,
    requested: Units,
) -> Result<ClaimReceipt, LedgerError> {
    if !wrapper.is_contract(contract) {
        return Err(LedgerError::invalid(format!(
            "can only claim from contract addresses, got {contract}"
        )));
    }

    let available = wrapper.balance_of(contract);
    let clamped = requested > available;
    let claimed = requested.min(available);
    if clamped {
        warn!(%contract, requested, available, "Claim exceeds contract balance, clamping");
    }

    let receipt = unwrap(ledger, wrapper, contract, recipient, claimed)?;

    wrapper.record(LedgerEvent::Claimed(Claimed {
        contract: contract.clone(),
        recipient: recipient.clone(),
        requested,
        claimed,
        underlying: receipt.underlying,
    }));

    Ok(ClaimReceipt {
        requested,
        claimed,
        underlying: receipt.underlying,
        clamped,
    })
}

/// Transfer `amount` underlying units, auto-wrapping when `to` is a
/// registered contract.
///
/// The auto-wrapped path is a single atomic step: the underlying moves into
/// the vault and the wrapped units are minted straight to `to`, so the
/// sender's wrapped balance is unchanged.
pub fn interact(
    ledger: &mut RebasingLedger,
    wrapper: &mut WrappedToken,
    from: &Address,
    to: &Address,
    amount: Units,
) -> Result<TransferOutcome, LedgerError> {
    wrapper.ensure_not_vault(from, "transfer")?;

    if wrapper.is_contract(to) {
        debug!(%from, %to, amount, "Auto-wrapping transfer to contract");
        let receipt = wrap_into(ledger, wrapper, from, to, amount)?;
        return Ok(TransferOutcome::AutoWrapped(receipt));
    }

    ledger.transfer(from, to, amount)?;
    Ok(TransferOutcome::Direct { amount })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrapper::WrapperConfig;
    use rebase_types::action::CorporateAction;
    use rebase_types::numeric::SCALE;

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    fn setup() -> (RebasingLedger, WrappedToken) {
        let mut ledger = RebasingLedger::new("TSLA");
        ledger.mint(&addr("alice"), 10).unwrap();
        let wrapper =
            WrappedToken::new(WrapperConfig::new("TSLA", "owTSLA").with_contract("0xCONTRACT"))
                .unwrap();
        (ledger, wrapper)
    }

    // ─── Wrap tests ───

    #[test]
    fn test_wrap_at_par() {
        let (mut ledger, mut wrapper) = setup();
        let receipt = wrap(&mut ledger, &mut wrapper, &addr("alice"), 4_000_000).unwrap();
        assert_eq!(receipt, WrapReceipt { underlying: 4_000_000, wrapped: 4_000_000 });
        assert_eq!(ledger.balance_of(&addr("alice")), 6_000_000);
        assert_eq!(ledger.balance_of(&addr("owTSLA")), 4_000_000);
        assert_eq!(wrapper.balance_of(&addr("alice")), 4_000_000);
        assert_eq!(wrapper.total_supply(), 4_000_000);
        assert_eq!(ledger.total_supply(), 10_000_000);
    }

    #[test]
    fn test_wrap_insufficient_leaves_both_ledgers() {
        let (mut ledger, mut wrapper) = setup();
        let result = wrap(&mut ledger, &mut wrapper, &addr("alice"), 10_000_001);
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
        assert_eq!(ledger.balance_of(&addr("alice")), 10_000_000);
        assert_eq!(ledger.balance_of(&addr("owTSLA")), 0);
        assert_eq!(wrapper.total_supply(), 0);
        assert!(wrapper.events().is_empty());
    }

    #[test]
    fn test_wrap_after_rebase_uses_new_rate() {
        let (mut ledger, mut wrapper) = setup();
        wrap(&mut ledger, &mut wrapper, &addr("alice"), 5_000_000).unwrap();
        ledger.apply_corporate_action(CorporateAction::split(2)).unwrap();
        wrapper.update_exchange_rate(&ledger).unwrap();

        // alice now holds 10 underlying; 2 underlying per wrapped
        let receipt = wrap(&mut ledger, &mut wrapper, &addr("alice"), 4_000_000).unwrap();
        assert_eq!(receipt.wrapped, 2_000_000);
        assert_eq!(wrapper.total_supply(), 7_000_000);
    }

    #[test]
    fn test_wrap_dust_rejected() {
        let (mut ledger, mut wrapper) = setup();
        wrap(&mut ledger, &mut wrapper, &addr("alice"), 1_000_000).unwrap();
        ledger.apply_corporate_action(CorporateAction::split(3)).unwrap();
        wrapper.update_exchange_rate(&ledger).unwrap();
        assert_eq!(wrapper.exchange_rate(), 3 * SCALE);

        let result = wrap(&mut ledger, &mut wrapper, &addr("alice"), 2);
        assert!(matches!(result, Err(LedgerError::InvalidOperation { .. })));
        assert_eq!(ledger.balance_of(&addr("owTSLA")), 3_000_000);
    }

    #[test]
    fn test_wrap_from_vault_rejected() {
        let (mut ledger, mut wrapper) = setup();
        wrap(&mut ledger, &mut wrapper, &addr("alice"), 5_000_000).unwrap();

        let result = wrap(&mut ledger, &mut wrapper, &addr("owTSLA"), 5_000_000);
        assert!(matches!(result, Err(LedgerError::InvalidOperation { .. })));
        assert_eq!(ledger.balance_of(&addr("owTSLA")), 5_000_000);
        assert_eq!(wrapper.total_supply(), 5_000_000);
        assert_eq!(wrapper.balance_of(&addr("owTSLA")), 0);

        // Alice's deposit is still fully backed
        wrapper.update_exchange_rate(&ledger).unwrap();
        assert_eq!(wrapper.exchange_rate(), SCALE);
        let receipt =
            unwrap(&mut ledger, &mut wrapper, &addr("alice"), &addr("alice"), 5_000_000).unwrap();
        assert_eq!(receipt.underlying, 5_000_000);
    }

    // ─── Unwrap tests ───

    #[test]
    fn test_unwrap_round_trip_at_par() {
        let (mut ledger, mut wrapper) = setup();
        wrap(&mut ledger, &mut wrapper, &addr("alice"), 4_000_000).unwrap();
        let receipt =
            unwrap(&mut ledger, &mut wrapper, &addr("alice"), &addr("alice"), 4_000_000).unwrap();
        assert_eq!(receipt.underlying, 4_000_000);
        assert_eq!(ledger.balance_of(&addr("alice")), 10_000_000);
        assert_eq!(ledger.balance_of(&addr("owTSLA")), 0);
        assert_eq!(wrapper.total_supply(), 0);
    }

    #[test]
    fn test_unwrap_to_other_recipient() {
        let (mut ledger, mut wrapper) = setup();
        wrap(&mut ledger, &mut wrapper, &addr("alice"), 4_000_000).unwrap();
        unwrap(&mut ledger, &mut wrapper, &addr("alice"), &addr("bob"), 1_000_000).unwrap();
        assert_eq!(ledger.balance_of(&addr("bob")), 1_000_000);
        assert_eq!(wrapper.balance_of(&addr("alice")), 3_000_000);
    }

    #[test]
    fn test_unwrap_insufficient_wrapped() {
        let (mut ledger, mut wrapper) = setup();
        wrap(&mut ledger, &mut wrapper, &addr("alice"), 1_000_000).unwrap();
        let result = unwrap(&mut ledger, &mut wrapper, &addr("alice"), &addr("alice"), 1_000_001);
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
        assert_eq!(wrapper.balance_of(&addr("alice")), 1_000_000);
        assert_eq!(ledger.balance_of(&addr("owTSLA")), 1_000_000);
    }

    // ─── Claim tests ───

    #[test]
    fn test_claim_from_non_contract_rejected() {
        let (mut ledger, mut wrapper) = setup();
        wrap(&mut ledger, &mut wrapper, &addr("alice"), 1_000_000).unwrap();
        let result = claim(&mut ledger, &mut wrapper, &addr("alice"), &addr("bob"), 1);
        assert!(matches!(result, Err(LedgerError::InvalidOperation { .. })));
        assert_eq!(wrapper.balance_of(&addr("alice")), 1_000_000);
    }

    #[test]
    fn test_claim_clamps_to_contract_balance() {
        let (mut ledger, mut wrapper) = setup();
        interact(&mut ledger, &mut wrapper, &addr("alice"), &addr("0xCONTRACT"), 2_000_000).unwrap();

        let receipt =
            claim(&mut ledger, &mut wrapper, &addr("0xCONTRACT"), &addr("bob"), 5_000_000).unwrap();
        assert_eq!(
            receipt,
            ClaimReceipt {
                requested: 5_000_000,
                claimed: 2_000_000,
                underlying: 2_000_000,
                clamped: true,
            }
        );
        assert_eq!(wrapper.balance_of(&addr("0xCONTRACT")), 0);
        assert_eq!(ledger.balance_of(&addr("bob")), 2_000_000);
        assert!(matches!(wrapper.events().last(), Some(LedgerEvent::Claimed(_))));
    }

    #[test]
    fn test_claim_empty_contract_is_zero() {
        let (mut ledger, mut wrapper) = setup();
        let receipt =
            claim(&mut ledger, &mut wrapper, &addr("0xCONTRACT"), &addr("bob"), 1_000_000).unwrap();
        assert_eq!(receipt.claimed, 0);
        assert_eq!(receipt.underlying, 0);
        assert!(receipt.clamped);
    }

    // ─── Interact tests ───

    #[test]
    fn test_interact_plain_transfer() {
        let (mut ledger, mut wrapper) = setup();
        let outcome =
            interact(&mut ledger, &mut wrapper, &addr("alice"), &addr("bob"), 3_000_000).unwrap();
        assert_eq!(outcome, TransferOutcome::Direct { amount: 3_000_000 });
        assert_eq!(ledger.balance_of(&addr("bob")), 3_000_000);
        assert_eq!(wrapper.total_supply(), 0);
    }

    #[test]
    fn test_interact_auto_wraps_for_contract() {
        let (mut ledger, mut wrapper) = setup();
        let outcome =
            interact(&mut ledger, &mut wrapper, &addr("alice"), &addr("0xCONTRACT"), 5_000_000)
                .unwrap();
        assert_eq!(
            outcome,
            TransferOutcome::AutoWrapped(WrapReceipt {
                underlying: 5_000_000,
                wrapped: 5_000_000,
            })
        );
        assert_eq!(ledger.balance_of(&addr("alice")), 5_000_000);
        assert_eq!(ledger.balance_of(&addr("owTSLA")), 5_000_000);
        assert_eq!(ledger.balance_of(&addr("0xCONTRACT")), 0);
        assert_eq!(wrapper.balance_of(&addr("0xCONTRACT")), 5_000_000);
        assert_eq!(wrapper.balance_of(&addr("alice")), 0);
    }

    #[test]
    fn test_interact_from_vault_rejected() {
        let (mut ledger, mut wrapper) = setup();
        wrap(&mut ledger, &mut wrapper, &addr("alice"), 4_000_000).unwrap();

        for to in [addr("bob"), addr("0xCONTRACT")] {
            let result = interact(&mut ledger, &mut wrapper, &addr("owTSLA"), &to, 1_000_000);
            assert!(matches!(result, Err(LedgerError::InvalidOperation { .. })));
        }
        assert_eq!(ledger.balance_of(&addr("owTSLA")), 4_000_000);
        assert_eq!(ledger.balance_of(&addr("bob")), 0);
        assert_eq!(wrapper.total_supply(), 4_000_000);
    }

    #[test]
    fn test_interact_insufficient_auto_wrap() {
        let (mut ledger, mut wrapper) = setup();
        let result =
            interact(&mut ledger, &mut wrapper, &addr("bob"), &addr("0xCONTRACT"), 1);
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
        assert_eq!(wrapper.total_supply(), 0);
    }
}
