//! Sundial - fungible-token ledger with a guarded AMM router gateway
//!
//! The engine keeps two verified ledgers (principal token and pool
//! shares), an ownership gate, a time-boxed mint window, and a
//! reentrancy latch, and composes local debits with calls into an
//! untrusted external router:
//!
//! 1. Balance and allowance mutation is delegated to the total, checked
//!    transitions in `ledger_model`; nothing in this crate does raw
//!    arithmetic on ledger state.
//! 2. The router is an abstract capability (`router_adapter::AmmRouter`);
//!    anything it does, including calling back into this instance,
//!    happens inside one guarded operation.
//! 3. Guarded operations are transactional: the affected ledgers are
//!    snapshotted before the first debit and restored on any failure, so
//!    an aborted operation leaves balances bit-for-bit unchanged.
//!
//! Execution model: one logical thread of control per instance. Calls
//! are serialized, but a router call may re-enter the instance before
//! returning; the latch makes any nested guarded operation fail with
//! `ReentrantCall` instead of observing mid-transition state.

pub mod access;
pub mod clock;
pub mod error;
pub mod guard;
pub mod testing;
pub mod token;

mod gateway;

// Re-export commonly used types
pub use clock::{Clock, SystemClock};
pub use error::TokenError;
pub use ledger_model::{Address, LedgerState};
pub use router_adapter::{
    AddLiquidityCall, AddLiquidityReceipt, AmmRouter, RemoveLiquidityCall,
    RemoveLiquidityReceipt, RouterError, SwapCall,
};
pub use token::{SunToken, TokenConfig, DEFAULT_MINT_WINDOW_SECS};
