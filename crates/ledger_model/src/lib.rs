//! Pure Rust ledger model for the Sundial token
//!
//! No dependencies, no unwrap/panic, all transitions total: every fallible
//! operation returns `Result` and leaves the state untouched on error.
//!
//! The engine crate never mutates balances, allowances, or supply directly;
//! all mutation goes through [`transitions`].
//!
//! This crate is no_std compatible.

#![no_std]
#![forbid(unsafe_code)]

#[cfg(kani)]
extern crate kani;

extern crate alloc;

pub mod state;
pub mod transitions;


// Re-export commonly used types
pub use state::{Address, AddressParseError, LedgerState};
pub use transitions::LedgerError;
