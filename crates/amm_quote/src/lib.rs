//! AMM Quote - Pure constant product math (x·y=k)
//!
//! Swap quotes and pro-rata liquidity-share math used by the in-memory
//! reference router. No pool state lives here; callers pass reserves in
//! and apply the results themselves.

#![no_std]
#![forbid(unsafe_code)]

pub mod math;

pub use math::{add_liquidity_amounts, quote_out, redeem_amounts, shares_to_mint};

/// Basis points scale (10,000 bps = 100%)
pub const BPS_SCALE: u128 = 10_000;

/// Error types for quote math
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteError {
    /// Zero reserve or zero share supply where liquidity is required
    InvalidReserves,
    /// Zero or out-of-range amount
    InvalidAmount,
    /// Pool cannot cover the request
    InsufficientLiquidity,
    /// Arithmetic overflow
    Overflow,
}
