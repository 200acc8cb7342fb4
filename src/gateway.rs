//! Router gateway: guarded operations that compose local ledger debits
//! with calls into the untrusted external router.
//!
//! Protocol per operation:
//! 1. Acquire the reentrancy latch (fails with `ReentrantCall`).
//! 2. Snapshot the affected ledger(s).
//! 3. Stage the local debit, invoke the router, reconcile the receipt
//!    with checked arithmetic.
//! 4. On any failure after staging, restore the snapshots, so an
//!    aborted operation leaves balances bit-for-bit as they were.
//!
//! Plain ledger operations are deliberately not guarded: a legitimate
//! router may pull tokens via `transfer_from` while a guarded operation
//! is in flight, and nested mutations ride the same all-or-nothing
//! envelope as the outer operation.

use crate::error::TokenError;
use crate::token::SunToken;
use ledger_model::{transitions, Address};
use router_adapter::{
    AddLiquidityCall, AddLiquidityReceipt, RemoveLiquidityCall, RemoveLiquidityReceipt, SwapCall,
    TokenPath,
};

impl SunToken {
    /// Swap an exact input amount of this token along `path` via the
    /// router, output delivered to the caller by the router's own
    /// accounting (the output asset is not tracked here).
    ///
    /// The caller's balance is debited by `amount_in` as a local
    /// reservation before the router runs; router failure restores it.
    /// Returns the router-reported per-hop amounts.
    pub fn swap_tokens_for_tokens(
        &self,
        caller: Address,
        amount_in: u128,
        amount_out_min: u128,
        path: &[Address],
    ) -> Result<Vec<u128>, TokenError> {
        let _guard = self.latch.try_enter()?;

        let mut hops = TokenPath::new();
        for hop in path {
            if hops.try_push(*hop).is_err() {
                return Err(TokenError::InvalidArgument);
            }
        }

        let snapshot = self.ledger.borrow().clone();
        let result = (|| -> Result<Vec<u128>, TokenError> {
            transitions::debit(&mut self.ledger.borrow_mut(), caller, amount_in)?;
            let call = SwapCall {
                amount_in,
                amount_out_min,
                path: hops,
                to: caller,
                deadline: self.clock.now(),
            };
            let amounts = self.router.swap_exact_tokens_for_tokens(&call)?;
            Ok(amounts)
        })();

        match result {
            Ok(amounts) => {
                log::info!("swap: caller={caller} amount_in={amount_in} hops={}", amounts.len());
                Ok(amounts)
            }
            Err(err) => {
                *self.ledger.borrow_mut() = snapshot;
                log::warn!("swap aborted: caller={caller} err={err}");
                Err(err)
            }
        }
    }

    /// Provide liquidity to the (this token, `token_b`) pool.
    ///
    /// Debits the caller by `amount_a_desired` up front; after a
    /// successful router call the unused portion
    /// (`amount_a_desired - amount_a`) is credited back and the minted
    /// pool shares are credited to the caller on the LP ledger. A router
    /// that reports consuming more than the desired amount fails the
    /// operation.
    pub fn add_liquidity(
        &self,
        caller: Address,
        token_b: Address,
        amount_a_desired: u128,
        amount_b_desired: u128,
        amount_a_min: u128,
        amount_b_min: u128,
    ) -> Result<AddLiquidityReceipt, TokenError> {
        let _guard = self.latch.try_enter()?;

        let snapshot = self.ledger.borrow().clone();
        let lp_snapshot = self.lp_ledger.borrow().clone();
        let result = (|| -> Result<AddLiquidityReceipt, TokenError> {
            transitions::debit(&mut self.ledger.borrow_mut(), caller, amount_a_desired)?;
            let call = AddLiquidityCall {
                token_a: self.token_id(),
                token_b,
                amount_a_desired,
                amount_b_desired,
                amount_a_min,
                amount_b_min,
                to: caller,
                deadline: self.clock.now(),
            };
            let receipt = self.router.add_liquidity(&call)?;

            let refund = amount_a_desired
                .checked_sub(receipt.amount_a)
                .ok_or(TokenError::Overflow)?;
            if refund > 0 {
                transitions::credit(&mut self.ledger.borrow_mut(), caller, refund)?;
            }
            transitions::mint(&mut self.lp_ledger.borrow_mut(), caller, receipt.liquidity)?;
            Ok(receipt)
        })();

        match result {
            Ok(receipt) => {
                log::info!(
                    "add_liquidity: caller={caller} token_b={token_b} consumed={} shares={}",
                    receipt.amount_a,
                    receipt.liquidity,
                );
                Ok(receipt)
            }
            Err(err) => {
                *self.ledger.borrow_mut() = snapshot;
                *self.lp_ledger.borrow_mut() = lp_snapshot;
                log::warn!("add_liquidity aborted: caller={caller} err={err}");
                Err(err)
            }
        }
    }

    /// Withdraw liquidity from the (this token, `token_b`) pool.
    ///
    /// The precondition and burn run against the LP ledger, not the
    /// principal balance map. Custody of the shares moves through the
    /// router's own share-token facet before the remove call; on success
    /// the caller's principal balance is credited with the router-
    /// reported `amount_a + amount_b` (checked). Failure of the pull or
    /// the remove call aborts the whole operation.
    pub fn remove_liquidity(
        &self,
        caller: Address,
        token_b: Address,
        liquidity: u128,
        amount_a_min: u128,
        amount_b_min: u128,
    ) -> Result<RemoveLiquidityReceipt, TokenError> {
        let _guard = self.latch.try_enter()?;

        let snapshot = self.ledger.borrow().clone();
        let lp_snapshot = self.lp_ledger.borrow().clone();
        let result = (|| -> Result<RemoveLiquidityReceipt, TokenError> {
            transitions::burn(&mut self.lp_ledger.borrow_mut(), caller, liquidity)?;
            self.router.transfer_from(caller, self.token_id(), liquidity)?;

            let call = RemoveLiquidityCall {
                token_a: self.token_id(),
                token_b,
                liquidity,
                amount_a_min,
                amount_b_min,
                to: caller,
                deadline: self.clock.now(),
            };
            let receipt = self.router.remove_liquidity(&call)?;

            let payout = receipt.payout_total().ok_or(TokenError::Overflow)?;
            transitions::credit(&mut self.ledger.borrow_mut(), caller, payout)?;
            Ok(receipt)
        })();

        match result {
            Ok(receipt) => {
                log::info!(
                    "remove_liquidity: caller={caller} token_b={token_b} shares={liquidity} payout_a={} payout_b={}",
                    receipt.amount_a,
                    receipt.amount_b,
                );
                Ok(receipt)
            }
            Err(err) => {
                *self.ledger.borrow_mut() = snapshot;
                *self.lp_ledger.borrow_mut() = lp_snapshot;
                log::warn!("remove_liquidity aborted: caller={caller} err={err}");
                Err(err)
            }
        }
    }
}
