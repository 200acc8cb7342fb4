//! Test and demo doubles
//!
//! `ManualClock` pins time for deterministic tests; `ReferenceRouter` is
//! an in-memory constant-product venue driven by the pure math in
//! `amm_quote`; `RejectAllRouter` fails every call. All three are used
//! by the workspace tests and the scenario CLI.

use crate::clock::Clock;
use amm_quote::QuoteError;
use ledger_model::Address;
use router_adapter::{
    path_is_well_formed, AddLiquidityCall, AddLiquidityReceipt, AmmRouter, RemoveLiquidityCall,
    RemoveLiquidityReceipt, RouterError, SwapCall,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Deterministic clock for tests and scenarios
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.set(now);
    }

    pub fn advance(&self, secs: u64) {
        self.now.set(self.now.get().saturating_add(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.get()
    }
}

/// Router double that fails every call; useful wherever the gateway is
/// not under test.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAllRouter;

impl AmmRouter for RejectAllRouter {
    fn swap_exact_tokens_for_tokens(&self, _call: &SwapCall) -> Result<Vec<u128>, RouterError> {
        Err(RouterError::Rejected)
    }

    fn add_liquidity(
        &self,
        _call: &AddLiquidityCall,
    ) -> Result<AddLiquidityReceipt, RouterError> {
        Err(RouterError::Rejected)
    }

    fn remove_liquidity(
        &self,
        _call: &RemoveLiquidityCall,
    ) -> Result<RemoveLiquidityReceipt, RouterError> {
        Err(RouterError::Rejected)
    }

    fn transfer_from(
        &self,
        _from: Address,
        _to: Address,
        _amount: u128,
    ) -> Result<(), RouterError> {
        Err(RouterError::Rejected)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Pool {
    reserve_a: u128,
    reserve_b: u128,
    share_supply: u128,
}

/// In-memory constant-product venue
///
/// Pools are keyed by the (token_a, token_b) pair of the first call that
/// touches them and answer swaps in either direction. Share balances are
/// one book across all pairs, matching the single share-token facet of
/// the `AmmRouter` interface. Deadlines are accepted as given: enforcing
/// them is the venue's concern and this double has no opinion.
pub struct ReferenceRouter {
    fee_bps: u128,
    pools: RefCell<BTreeMap<(Address, Address), Pool>>,
    shares: RefCell<BTreeMap<Address, u128>>,
}

impl ReferenceRouter {
    /// Venue with the given swap fee in basis points
    pub fn new(fee_bps: u128) -> Self {
        Self {
            fee_bps,
            pools: RefCell::new(BTreeMap::new()),
            shares: RefCell::new(BTreeMap::new()),
        }
    }

    /// Create a pool with preexisting reserves. The seed shares are left
    /// unassigned, like a pool whose founding depositor is not a party
    /// to the test.
    pub fn seed_pool(
        &self,
        token_a: Address,
        token_b: Address,
        reserve_a: u128,
        reserve_b: u128,
    ) -> Result<(), RouterError> {
        let seed_shares = amm_quote::shares_to_mint(0, 0, 0, reserve_a, reserve_b)
            .map_err(map_quote_err)?;
        self.pools.borrow_mut().insert(
            (token_a, token_b),
            Pool {
                reserve_a,
                reserve_b,
                share_supply: seed_shares,
            },
        );
        Ok(())
    }

    /// Pool shares held by `account` on this venue
    pub fn share_balance_of(&self, account: Address) -> u128 {
        self.shares.borrow().get(&account).copied().unwrap_or(0)
    }

    /// Current reserves of the (token_a, token_b) pool, call-oriented
    pub fn reserves(&self, token_a: Address, token_b: Address) -> Option<(u128, u128)> {
        let pools = self.pools.borrow();
        find_pool(&pools, token_a, token_b).map(|(key, forward)| {
            let pool = pools[&key];
            if forward {
                (pool.reserve_a, pool.reserve_b)
            } else {
                (pool.reserve_b, pool.reserve_a)
            }
        })
    }

    fn move_shares(&self, from: Address, to: Address, amount: u128) -> Result<(), RouterError> {
        let mut shares = self.shares.borrow_mut();
        let from_balance = shares.get(&from).copied().unwrap_or(0);
        if from == to {
            return if from_balance >= amount {
                Ok(())
            } else {
                Err(RouterError::TransferFailed)
            };
        }
        let updated_from = from_balance
            .checked_sub(amount)
            .ok_or(RouterError::TransferFailed)?;
        let to_balance = shares.get(&to).copied().unwrap_or(0);
        let updated_to = to_balance
            .checked_add(amount)
            .ok_or(RouterError::TransferFailed)?;
        shares.insert(from, updated_from);
        shares.insert(to, updated_to);
        Ok(())
    }
}

/// Locate a pool for the pair in either orientation; `true` means the
/// key's A side is the caller's A side.
fn find_pool(
    pools: &BTreeMap<(Address, Address), Pool>,
    token_a: Address,
    token_b: Address,
) -> Option<((Address, Address), bool)> {
    if pools.contains_key(&(token_a, token_b)) {
        Some(((token_a, token_b), true))
    } else if pools.contains_key(&(token_b, token_a)) {
        Some(((token_b, token_a), false))
    } else {
        None
    }
}

fn map_quote_err(err: QuoteError) -> RouterError {
    match err {
        QuoteError::InvalidReserves | QuoteError::InsufficientLiquidity => {
            RouterError::InsufficientLiquidity
        }
        QuoteError::InvalidAmount | QuoteError::Overflow => RouterError::Rejected,
    }
}

impl AmmRouter for ReferenceRouter {
    fn swap_exact_tokens_for_tokens(&self, call: &SwapCall) -> Result<Vec<u128>, RouterError> {
        if !path_is_well_formed(&call.path) {
            return Err(RouterError::InvalidPath);
        }
        if call.to.is_zero() {
            return Err(RouterError::Rejected);
        }

        // Quote the whole path against a working copy and commit only if
        // every hop clears, so a failed swap leaves the venue untouched.
        let mut pools = self.pools.borrow_mut();
        let mut staged = pools.clone();
        let mut amounts = vec![call.amount_in];
        let mut current = call.amount_in;

        for pair in call.path.windows(2) {
            let (key, forward) =
                find_pool(&staged, pair[0], pair[1]).ok_or(RouterError::InvalidPath)?;
            let pool = staged.get_mut(&key).ok_or(RouterError::InvalidPath)?;
            let (reserve_in, reserve_out) = if forward {
                (pool.reserve_a, pool.reserve_b)
            } else {
                (pool.reserve_b, pool.reserve_a)
            };

            let out =
                amm_quote::quote_out(reserve_in, reserve_out, self.fee_bps, current)
                    .map_err(map_quote_err)?;
            let new_in = reserve_in
                .checked_add(current)
                .ok_or(RouterError::Rejected)?;
            let new_out = reserve_out - out;
            if forward {
                pool.reserve_a = new_in;
                pool.reserve_b = new_out;
            } else {
                pool.reserve_b = new_in;
                pool.reserve_a = new_out;
            }
            amounts.push(out);
            current = out;
        }

        if current < call.amount_out_min {
            return Err(RouterError::InsufficientOutput);
        }
        *pools = staged;
        Ok(amounts)
    }

    fn add_liquidity(&self, call: &AddLiquidityCall) -> Result<AddLiquidityReceipt, RouterError> {
        if call.to.is_zero() || call.token_a.is_zero() || call.token_b.is_zero() {
            return Err(RouterError::Rejected);
        }

        let mut pools = self.pools.borrow_mut();
        let (key, forward) = find_pool(&pools, call.token_a, call.token_b)
            .unwrap_or(((call.token_a, call.token_b), true));
        let pool = pools.entry(key).or_default();

        let (desired_a, desired_b) = if forward {
            (call.amount_a_desired, call.amount_b_desired)
        } else {
            (call.amount_b_desired, call.amount_a_desired)
        };

        let (used_a, used_b) =
            amm_quote::add_liquidity_amounts(pool.reserve_a, pool.reserve_b, desired_a, desired_b)
                .map_err(map_quote_err)?;
        let minted = amm_quote::shares_to_mint(
            pool.share_supply,
            pool.reserve_a,
            pool.reserve_b,
            used_a,
            used_b,
        )
        .map_err(map_quote_err)?;

        let (call_used_a, call_used_b) = if forward { (used_a, used_b) } else { (used_b, used_a) };
        if call_used_a < call.amount_a_min || call_used_b < call.amount_b_min {
            return Err(RouterError::InsufficientAmount);
        }

        // Compute every updated value before committing anything, so a
        // rejected call leaves the venue untouched
        let new_reserve_a = pool
            .reserve_a
            .checked_add(used_a)
            .ok_or(RouterError::Rejected)?;
        let new_reserve_b = pool
            .reserve_b
            .checked_add(used_b)
            .ok_or(RouterError::Rejected)?;
        let new_supply = pool
            .share_supply
            .checked_add(minted)
            .ok_or(RouterError::Rejected)?;
        let mut shares = self.shares.borrow_mut();
        let updated_shares = shares
            .get(&call.to)
            .copied()
            .unwrap_or(0)
            .checked_add(minted)
            .ok_or(RouterError::Rejected)?;

        pool.reserve_a = new_reserve_a;
        pool.reserve_b = new_reserve_b;
        pool.share_supply = new_supply;
        shares.insert(call.to, updated_shares);

        Ok(AddLiquidityReceipt {
            amount_a: call_used_a,
            amount_b: call_used_b,
            liquidity: minted,
        })
    }

    fn remove_liquidity(
        &self,
        call: &RemoveLiquidityCall,
    ) -> Result<RemoveLiquidityReceipt, RouterError> {
        // The gateway pulls the shares to its own token identifier before
        // this call, so token_a doubles as the share holder here.
        let holder = call.token_a;

        let mut pools = self.pools.borrow_mut();
        let (key, forward) =
            find_pool(&pools, call.token_a, call.token_b).ok_or(RouterError::InvalidPath)?;
        let pool = pools.get_mut(&key).ok_or(RouterError::InvalidPath)?;

        if self.share_balance_of(holder) < call.liquidity {
            return Err(RouterError::InsufficientLiquidity);
        }

        let (out_a, out_b) = amm_quote::redeem_amounts(
            pool.share_supply,
            call.liquidity,
            pool.reserve_a,
            pool.reserve_b,
        )
        .map_err(map_quote_err)?;

        let (call_out_a, call_out_b) = if forward { (out_a, out_b) } else { (out_b, out_a) };
        if call_out_a < call.amount_a_min || call_out_b < call.amount_b_min {
            return Err(RouterError::InsufficientAmount);
        }

        pool.reserve_a -= out_a;
        pool.reserve_b -= out_b;
        pool.share_supply -= call.liquidity;
        drop(pools);

        let mut shares = self.shares.borrow_mut();
        let balance = shares.get(&holder).copied().unwrap_or(0);
        shares.insert(holder, balance - call.liquidity);

        Ok(RemoveLiquidityReceipt {
            amount_a: call_out_a,
            amount_b: call_out_b,
        })
    }

    fn transfer_from(&self, from: Address, to: Address, amount: u128) -> Result<(), RouterError> {
        self.move_shares(from, to, amount)
    }
}
