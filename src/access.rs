//! Ownership gate
//!
//! Tracks the single privileged principal. There is no other mutation
//! path for the owner field than `transfer`.

use crate::error::TokenError;
use ledger_model::Address;
use std::cell::Cell;

/// Single-owner access control
#[derive(Debug)]
pub struct OwnerGate {
    owner: Cell<Address>,
}

impl OwnerGate {
    /// Gate owned by `owner` (the constructing principal)
    pub fn new(owner: Address) -> Self {
        Self {
            owner: Cell::new(owner),
        }
    }

    /// Current owner
    pub fn owner(&self) -> Address {
        self.owner.get()
    }

    /// Fails with `Unauthorized` unless `caller` is the current owner
    pub fn ensure_owner(&self, caller: Address) -> Result<(), TokenError> {
        if caller != self.owner.get() {
            return Err(TokenError::Unauthorized);
        }
        Ok(())
    }

    /// Replace the owner. Owner-only; the new owner must be non-null.
    pub fn transfer(&self, caller: Address, new_owner: Address) -> Result<(), TokenError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(TokenError::InvalidArgument);
        }
        let previous = self.owner.replace(new_owner);
        log::info!("ownership transferred: {previous} -> {new_owner}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Address = Address::from_low_u64(1);
    const OTHER: Address = Address::from_low_u64(2);

    #[test]
    fn test_transfer_replaces_owner() {
        let gate = OwnerGate::new(OWNER);
        gate.transfer(OWNER, OTHER).unwrap();

        assert_eq!(gate.owner(), OTHER);
        assert_eq!(gate.ensure_owner(OWNER), Err(TokenError::Unauthorized));
        assert_eq!(gate.ensure_owner(OTHER), Ok(()));
    }

    #[test]
    fn test_non_owner_cannot_transfer() {
        let gate = OwnerGate::new(OWNER);
        assert_eq!(
            gate.transfer(OTHER, OTHER),
            Err(TokenError::Unauthorized)
        );
        assert_eq!(gate.owner(), OWNER);
    }

    #[test]
    fn test_zero_new_owner_rejected() {
        let gate = OwnerGate::new(OWNER);
        assert_eq!(
            gate.transfer(OWNER, Address::ZERO),
            Err(TokenError::InvalidArgument)
        );
        assert_eq!(gate.owner(), OWNER);
    }
}
