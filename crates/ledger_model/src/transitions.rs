//! Ledger transitions
//!
//! Every balance, allowance, or supply mutation in the system goes through
//! the functions in this module. Each transition validates all of its
//! preconditions before touching the state, so a returned error always
//! means "nothing changed".
//!
//! # Properties
//! - **C1**: Conservation - Σ(balances) == total_supply is preserved by
//!   `transfer`, `transfer_from`, `mint`, and `burn`
//! - **C2**: No wraparound - any mutation that would underflow or overflow
//!   fails instead of saturating or wrapping
//! - **C3**: Self-transfer is a balance no-op and is not rejected
//! - **C4**: `approve` sets the allowance absolutely (overwrite, not delta)
//! - **C5**: `transfer_from` consumes exactly the transferred amount from
//!   the allowance

use crate::state::{Address, LedgerState};
use core::fmt;

/// Error types for ledger transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    /// Null identifier where a valid counterparty is required
    ZeroAddress,
    /// Debit larger than the current balance
    InsufficientBalance,
    /// Delegated transfer larger than the remaining allowance
    AllowanceExceeded,
    /// Arithmetic overflow
    Overflow,
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroAddress => f.write_str("zero address"),
            Self::InsufficientBalance => f.write_str("insufficient balance"),
            Self::AllowanceExceeded => f.write_str("allowance exceeded"),
            Self::Overflow => f.write_str("arithmetic overflow"),
        }
    }
}

/// Increase `account`'s balance by exactly `amount`.
///
/// Settlement primitive for the gateway: moves the balance map without
/// touching supply. Not part of the token-facing surface.
pub fn credit(state: &mut LedgerState, account: Address, amount: u128) -> Result<(), LedgerError> {
    let updated = state
        .balance_of(account)
        .checked_add(amount)
        .ok_or(LedgerError::Overflow)?;
    state.set_balance(account, updated);
    Ok(())
}

/// Decrease `account`'s balance by exactly `amount`.
///
/// Reservation primitive for the gateway; fails rather than going
/// negative (C2).
pub fn debit(state: &mut LedgerState, account: Address, amount: u128) -> Result<(), LedgerError> {
    let updated = state
        .balance_of(account)
        .checked_sub(amount)
        .ok_or(LedgerError::InsufficientBalance)?;
    state.set_balance(account, updated);
    Ok(())
}

/// Move `amount` from `from` to `to`, atomically.
///
/// Both sides are validated before either is written (C2). A
/// self-transfer within balance succeeds and changes nothing (C3).
pub fn transfer(
    state: &mut LedgerState,
    from: Address,
    to: Address,
    amount: u128,
) -> Result<(), LedgerError> {
    if to.is_zero() {
        return Err(LedgerError::ZeroAddress);
    }
    if from == to {
        if state.balance_of(from) < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        return Ok(());
    }
    let new_from = state
        .balance_of(from)
        .checked_sub(amount)
        .ok_or(LedgerError::InsufficientBalance)?;
    let new_to = state
        .balance_of(to)
        .checked_add(amount)
        .ok_or(LedgerError::Overflow)?;
    state.set_balance(from, new_from);
    state.set_balance(to, new_to);
    Ok(())
}

/// Set `spender`'s allowance over `owner`'s balance to exactly `amount` (C4).
pub fn approve(
    state: &mut LedgerState,
    owner: Address,
    spender: Address,
    amount: u128,
) -> Result<(), LedgerError> {
    if spender.is_zero() {
        return Err(LedgerError::ZeroAddress);
    }
    state.set_allowance(owner, spender, amount);
    Ok(())
}

/// Delegated transfer: `spender` moves `amount` from `from` to `to`.
///
/// The balance precondition and the allowance precondition are both
/// evaluated before any mutation; on success the allowance drops by
/// exactly `amount` (C5).
pub fn transfer_from(
    state: &mut LedgerState,
    spender: Address,
    from: Address,
    to: Address,
    amount: u128,
) -> Result<(), LedgerError> {
    if to.is_zero() {
        return Err(LedgerError::ZeroAddress);
    }
    if state.balance_of(from) < amount {
        return Err(LedgerError::InsufficientBalance);
    }
    let remaining = state
        .allowance(from, spender)
        .checked_sub(amount)
        .ok_or(LedgerError::AllowanceExceeded)?;
    transfer(state, from, to, amount)?;
    state.set_allowance(from, spender, remaining);
    Ok(())
}

/// Issue `amount` new units to `to`, raising supply and balance together.
pub fn mint(state: &mut LedgerState, to: Address, amount: u128) -> Result<(), LedgerError> {
    let new_supply = state
        .total_supply()
        .checked_add(amount)
        .ok_or(LedgerError::Overflow)?;
    let new_balance = state
        .balance_of(to)
        .checked_add(amount)
        .ok_or(LedgerError::Overflow)?;
    state.set_total_supply(new_supply);
    state.set_balance(to, new_balance);
    Ok(())
}

/// Retire `amount` units from `from`, lowering supply and balance together.
///
/// The principal token has no burn path; this exists for share ledgers
/// (LP accounting) that mirror externally minted and retired units.
pub fn burn(state: &mut LedgerState, from: Address, amount: u128) -> Result<(), LedgerError> {
    let new_balance = state
        .balance_of(from)
        .checked_sub(amount)
        .ok_or(LedgerError::InsufficientBalance)?;
    let new_supply = state
        .total_supply()
        .checked_sub(amount)
        .ok_or(LedgerError::Overflow)?;
    state.set_balance(from, new_balance);
    state.set_total_supply(new_supply);
    Ok(())
}


// ============================================================================
// Kani Formal Verification Proofs
// ============================================================================

#[cfg(kani)]
mod proofs {
    use super::*;

    const BOUND: u128 = 1_000_000_000;

    /// Helper: two-account ledger with bounded balances
    fn bounded_state(a: Address, b: Address) -> LedgerState {
        let bal_a: u128 = kani::any();
        let bal_b: u128 = kani::any();
        kani::assume(bal_a <= BOUND);
        kani::assume(bal_b <= BOUND);

        let mut state = LedgerState::new();
        let _ = mint(&mut state, a, bal_a);
        let _ = mint(&mut state, b, bal_b);
        state
    }

    /// **Proof C1: transfer preserves the balance sum**
    #[kani::proof]
    fn proof_c1_transfer_preserves_sum() {
        let a = Address::from_low_u64(1);
        let b = Address::from_low_u64(2);
        let mut state = bounded_state(a, b);
        let supply = state.total_supply();

        let amount: u128 = kani::any();
        kani::assume(amount <= BOUND);

        let _ = transfer(&mut state, a, b, amount);

        assert!(state.total_supply() == supply);
        assert!(state.conservation_ok());
    }

    /// **Proof C2: a failed transfer leaves the state untouched**
    #[kani::proof]
    fn proof_c2_failed_transfer_is_noop() {
        let a = Address::from_low_u64(1);
        let b = Address::from_low_u64(2);
        let mut state = bounded_state(a, b);
        let before = state.clone();

        let amount: u128 = kani::any();
        kani::assume(amount > state.balance_of(a));

        let result = transfer(&mut state, a, b, amount);

        assert!(result == Err(LedgerError::InsufficientBalance));
        assert!(state == before);
    }

    /// **Proof C4: approve overwrites the previous allowance**
    #[kani::proof]
    fn proof_c4_approve_overwrites() {
        let owner = Address::from_low_u64(1);
        let spender = Address::from_low_u64(2);
        let mut state = LedgerState::new();

        let first: u128 = kani::any();
        let second: u128 = kani::any();

        let _ = approve(&mut state, owner, spender, first);
        let _ = approve(&mut state, owner, spender, second);

        assert!(state.allowance(owner, spender) == second);
    }

    /// **Proof C5: delegated transfer consumes exactly the moved amount**
    #[kani::proof]
    fn proof_c5_allowance_exact_consumption() {
        let a = Address::from_low_u64(1);
        let b = Address::from_low_u64(2);
        let spender = Address::from_low_u64(3);
        let mut state = bounded_state(a, b);

        let allowed: u128 = kani::any();
        let amount: u128 = kani::any();
        kani::assume(allowed <= BOUND);
        kani::assume(amount <= allowed);
        kani::assume(amount <= state.balance_of(a));

        let _ = approve(&mut state, a, spender, allowed);

        if transfer_from(&mut state, spender, a, b, amount).is_ok() {
            assert!(state.allowance(a, spender) == allowed - amount);
        }
    }

    /// **Proof W1: mint raises supply and balance by the exact amount**
    #[kani::proof]
    fn proof_w1_mint_exact_increase() {
        let a = Address::from_low_u64(1);
        let b = Address::from_low_u64(2);
        let mut state = bounded_state(a, b);
        let supply = state.total_supply();
        let balance = state.balance_of(b);

        let amount: u128 = kani::any();
        kani::assume(amount <= BOUND);

        if mint(&mut state, b, amount).is_ok() {
            assert!(state.total_supply() == supply + amount);
            assert!(state.balance_of(b) == balance + amount);
        }
    }
}
