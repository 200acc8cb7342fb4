//! Token engine: construction, metadata, ledger surface, mint window
//!
//! Every state mutation here goes through the verified transitions in
//! `ledger_model`; this module adds identity, authorization, and the
//! time gate on issuance. The guarded router operations live in the
//! gateway module.

use crate::access::OwnerGate;
use crate::clock::Clock;
use crate::error::TokenError;
use crate::guard::ReentrancyLatch;
use ledger_model::{transitions, Address, LedgerState};
use router_adapter::AmmRouter;
use std::cell::RefCell;
use std::rc::Rc;

/// Default issuance window after construction: 90 days
pub const DEFAULT_MINT_WINDOW_SECS: u64 = 90 * 24 * 60 * 60;

/// Construction parameters
///
/// `initial_supply` is given in whole tokens and scaled by
/// `10^decimals` at construction. `token_id` is this instance's own
/// identifier (passed to the router as token A of every pair);
/// `router_id` identifies the venue the gateway talks to.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub initial_supply: u128,
    pub token_id: Address,
    pub router_id: Address,
    pub mint_window_secs: u64,
}

impl TokenConfig {
    /// Config with the standard 18 decimals and the default mint window
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        initial_supply: u128,
        token_id: Address,
        router_id: Address,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals: 18,
            initial_supply,
            token_id,
            router_id,
            mint_window_secs: DEFAULT_MINT_WINDOW_SECS,
        }
    }
}

/// The token instance: metadata, owner gate, principal and LP-share
/// ledgers, mint deadline, reentrancy latch, and the router capability.
///
/// Methods take the acting principal (`caller`) explicitly; there is no
/// ambient signer. Interior mutability models the serialized-calls-with-
/// possible-reentry execution of the platform: no borrow is held across
/// a router call, so nested calls observe a consistent ledger.
pub struct SunToken {
    name: String,
    symbol: String,
    decimals: u8,
    token_id: Address,
    router_id: Address,
    owner: OwnerGate,
    mint_deadline: u64,
    pub(crate) ledger: RefCell<LedgerState>,
    pub(crate) lp_ledger: RefCell<LedgerState>,
    pub(crate) latch: ReentrancyLatch,
    pub(crate) router: Rc<dyn AmmRouter>,
    pub(crate) clock: Rc<dyn Clock>,
}

impl SunToken {
    /// Construct the instance, crediting the full scaled initial supply
    /// to `deployer` and fixing the mint deadline at `now + window`.
    pub fn new(
        config: TokenConfig,
        deployer: Address,
        router: Rc<dyn AmmRouter>,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, TokenError> {
        if deployer.is_zero() || config.token_id.is_zero() || config.router_id.is_zero() {
            return Err(TokenError::InvalidArgument);
        }
        let scale = 10u128
            .checked_pow(u32::from(config.decimals))
            .ok_or(TokenError::Overflow)?;
        let supply = config
            .initial_supply
            .checked_mul(scale)
            .ok_or(TokenError::Overflow)?;
        let mint_deadline = clock
            .now()
            .checked_add(config.mint_window_secs)
            .ok_or(TokenError::Overflow)?;

        log::info!(
            "token created: {} ({}) supply={supply} owner={deployer} mint_deadline={mint_deadline}",
            config.name,
            config.symbol,
        );

        Ok(Self {
            name: config.name,
            symbol: config.symbol,
            decimals: config.decimals,
            token_id: config.token_id,
            router_id: config.router_id,
            owner: OwnerGate::new(deployer),
            mint_deadline,
            ledger: RefCell::new(LedgerState::with_initial_supply(deployer, supply)),
            lp_ledger: RefCell::new(LedgerState::new()),
            latch: ReentrancyLatch::new(),
            router,
            clock,
        })
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// This instance's own identifier
    pub fn token_id(&self) -> Address {
        self.token_id
    }

    /// Identifier of the router venue
    pub fn router_id(&self) -> Address {
        self.router_id
    }

    pub fn owner(&self) -> Address {
        self.owner.owner()
    }

    /// Instant at and after which issuance is permanently disabled
    pub fn mint_deadline(&self) -> u64 {
        self.mint_deadline
    }

    // ========================================================================
    // Ledger reads
    // ========================================================================

    pub fn total_supply(&self) -> u128 {
        self.ledger.borrow().total_supply()
    }

    pub fn balance_of(&self, account: Address) -> u128 {
        self.ledger.borrow().balance_of(account)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> u128 {
        self.ledger.borrow().allowance(owner, spender)
    }

    /// Pool shares held on the separate LP ledger
    pub fn lp_balance_of(&self, account: Address) -> u128 {
        self.lp_ledger.borrow().balance_of(account)
    }

    /// Copy of the principal ledger, for inspection and snapshots
    pub fn ledger_snapshot(&self) -> LedgerState {
        self.ledger.borrow().clone()
    }

    /// Copy of the LP share ledger
    pub fn lp_ledger_snapshot(&self) -> LedgerState {
        self.lp_ledger.borrow().clone()
    }

    // ========================================================================
    // Ledger mutation
    // ========================================================================

    /// Move `amount` from the caller to `to`
    pub fn transfer(&self, caller: Address, to: Address, amount: u128) -> Result<(), TokenError> {
        transitions::transfer(&mut self.ledger.borrow_mut(), caller, to, amount)?;
        log::debug!("transfer: {caller} -> {to} amount={amount}");
        Ok(())
    }

    /// Set `spender`'s allowance over the caller's balance to exactly `amount`
    pub fn approve(
        &self,
        caller: Address,
        spender: Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        transitions::approve(&mut self.ledger.borrow_mut(), caller, spender, amount)?;
        log::debug!("approval: {caller} allows {spender} amount={amount}");
        Ok(())
    }

    /// Delegated transfer: the caller spends its allowance over `from`
    pub fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        transitions::transfer_from(&mut self.ledger.borrow_mut(), caller, from, to, amount)?;
        log::debug!("transfer_from: {from} -> {to} amount={amount} spender={caller}");
        Ok(())
    }

    /// Replace the owner (owner-only; new owner must be non-null)
    pub fn transfer_ownership(
        &self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), TokenError> {
        self.owner.transfer(caller, new_owner)
    }

    /// Issue `amount` units to `recipient`. Owner-only and only strictly
    /// before the mint deadline; afterwards this path is permanently
    /// disabled.
    pub fn mint(
        &self,
        caller: Address,
        recipient: Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.owner.ensure_owner(caller)?;
        if self.clock.now() >= self.mint_deadline {
            return Err(TokenError::MintWindowClosed);
        }
        transitions::mint(&mut self.ledger.borrow_mut(), recipient, amount)?;
        log::info!("mint: {recipient} amount={amount}");
        Ok(())
    }
}
