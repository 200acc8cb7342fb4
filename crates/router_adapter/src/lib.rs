//! Router Adapter - Stable boundary to external AMM routers
//!
//! This crate defines the interface between the token gateway and any
//! router implementation (production venue, in-memory reference, or an
//! adversarial double in tests).
//!
//! # Design Principles
//! - no_std + alloc
//! - The router is an untrusted capability: the gateway hands it plain
//!   call values and reconciles plain receipt values, nothing else
//! - Receipts are data, not promises; all reconciliation arithmetic on
//!   them is checked on the gateway side

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

use alloc::vec::Vec;
use arrayvec::ArrayVec;
use core::fmt;

pub use ledger_model::Address;

// ============================================================================
// Swap path
// ============================================================================

/// Maximum number of hops in a swap path
pub const MAX_PATH_HOPS: usize = 4;

/// Bounded swap path: input token first, output token last
pub type TokenPath = ArrayVec<Address, MAX_PATH_HOPS>;

/// Two-hop path for a direct pair
pub fn pair_path(token_in: Address, token_out: Address) -> TokenPath {
    let mut path = TokenPath::new();
    path.push(token_in);
    path.push(token_out);
    path
}

/// A path is well formed when it has at least two hops and no null hop
pub fn path_is_well_formed(path: &[Address]) -> bool {
    path.len() >= 2 && path.iter().all(|hop| !hop.is_zero())
}

// ============================================================================
// Calls and receipts
// ============================================================================

/// Swap request: exact input amount along `path`, output to `to`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapCall {
    /// Exact input amount
    pub amount_in: u128,
    /// Minimum acceptable output amount
    pub amount_out_min: u128,
    /// Hop sequence, input token first
    pub path: TokenPath,
    /// Recipient of the output tokens
    pub to: Address,
    /// Latest acceptable execution time (unix seconds); enforced by the
    /// router, not by the gateway
    pub deadline: u64,
}

/// Add-liquidity request for the (token_a, token_b) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddLiquidityCall {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a_desired: u128,
    pub amount_b_desired: u128,
    pub amount_a_min: u128,
    pub amount_b_min: u128,
    /// Recipient of the minted pool shares
    pub to: Address,
    pub deadline: u64,
}

/// Router-reported outcome of an add-liquidity call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddLiquidityReceipt {
    /// Amount of token A actually consumed (may be below the desired amount)
    pub amount_a: u128,
    /// Amount of token B actually consumed
    pub amount_b: u128,
    /// Pool shares minted to `to`
    pub liquidity: u128,
}

/// Remove-liquidity request for the (token_a, token_b) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveLiquidityCall {
    pub token_a: Address,
    pub token_b: Address,
    /// Pool shares to burn
    pub liquidity: u128,
    pub amount_a_min: u128,
    pub amount_b_min: u128,
    /// Recipient of the withdrawn assets
    pub to: Address,
    pub deadline: u64,
}

/// Router-reported outcome of a remove-liquidity call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveLiquidityReceipt {
    pub amount_a: u128,
    pub amount_b: u128,
}

impl RemoveLiquidityReceipt {
    /// Checked total payout (`amount_a + amount_b`)
    pub fn payout_total(&self) -> Option<u128> {
        self.amount_a.checked_add(self.amount_b)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Failure reported by a router call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterError {
    /// Deadline already passed when the router executed
    Expired,
    /// Output would fall below the caller's minimum
    InsufficientOutput,
    /// Consumed amounts would fall below the caller's minimums
    InsufficientAmount,
    /// Pool has no or too little liquidity for the request
    InsufficientLiquidity,
    /// Malformed or unknown hop sequence
    InvalidPath,
    /// Token custody transfer inside the router failed
    TransferFailed,
    /// The router rejected the call outright
    Rejected,
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => f.write_str("deadline expired"),
            Self::InsufficientOutput => f.write_str("output below minimum"),
            Self::InsufficientAmount => f.write_str("consumed amount below minimum"),
            Self::InsufficientLiquidity => f.write_str("insufficient pool liquidity"),
            Self::InvalidPath => f.write_str("invalid swap path"),
            Self::TransferFailed => f.write_str("router token transfer failed"),
            Self::Rejected => f.write_str("call rejected by router"),
        }
    }
}

// ============================================================================
// Capability trait
// ============================================================================

/// External AMM router capability consumed by the token gateway.
///
/// Implementations own their pool math and pool state entirely. Anything
/// a method does, including calling back into the token instance, happens
/// before it returns; the gateway treats the whole call as one opaque
/// step that either yields a receipt or fails.
pub trait AmmRouter {
    /// Swap an exact input amount along `call.path`; returns the amounts
    /// moved at each hop, input first, final output last.
    fn swap_exact_tokens_for_tokens(&self, call: &SwapCall) -> Result<Vec<u128>, RouterError>;

    /// Add liquidity to the pair pool; consumed amounts and minted shares
    /// come back in the receipt.
    fn add_liquidity(&self, call: &AddLiquidityCall)
        -> Result<AddLiquidityReceipt, RouterError>;

    /// Burn pool shares and withdraw both assets to `call.to`.
    fn remove_liquidity(
        &self,
        call: &RemoveLiquidityCall,
    ) -> Result<RemoveLiquidityReceipt, RouterError>;

    /// The router's own share-token facet: move `amount` pool shares from
    /// `from` to `to`. Used by the gateway to pull shares into custody
    /// before a remove-liquidity call.
    fn transfer_from(&self, from: Address, to: Address, amount: u128)
        -> Result<(), RouterError>;
}
