//! Reentrancy latch
//!
//! A boolean latch on the token instance, acquired through a scope
//! handle so release runs on every exit path, including failures. The
//! source system toggled a free-standing flag by hand at each call
//! site; here the drop of [`LatchGuard`] is the single release point.

use crate::error::TokenError;
use std::cell::Cell;

/// Per-instance reentrancy latch. False at rest; true only for the
/// dynamic extent of a guarded operation, including any external call
/// it makes.
#[derive(Debug, Default)]
pub struct ReentrancyLatch {
    entered: Cell<bool>,
}

impl ReentrancyLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the latch, or fail with `ReentrantCall` if a guarded
    /// operation is already in progress. The guarded body never runs in
    /// the failure case.
    pub fn try_enter(&self) -> Result<LatchGuard<'_>, TokenError> {
        if self.entered.replace(true) {
            // Already held by the outer operation; leave it set.
            return Err(TokenError::ReentrantCall);
        }
        Ok(LatchGuard { latch: self })
    }

    /// True while a guarded operation is in progress
    pub fn is_entered(&self) -> bool {
        self.entered.get()
    }
}

/// Scope handle for the latch; dropping it releases the latch.
#[must_use]
pub struct LatchGuard<'a> {
    latch: &'a ReentrancyLatch,
}

impl Drop for LatchGuard<'_> {
    fn drop(&mut self) {
        self.latch.entered.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_enter_fails() {
        let latch = ReentrancyLatch::new();
        let guard = latch.try_enter().unwrap();

        assert!(matches!(latch.try_enter(), Err(TokenError::ReentrantCall)));
        assert!(latch.is_entered());

        drop(guard);
        assert!(!latch.is_entered());
    }

    #[test]
    fn test_failed_nested_enter_does_not_release() {
        let latch = ReentrancyLatch::new();
        let guard = latch.try_enter().unwrap();

        // The rejected nested attempt must not clear the outer hold
        let _ = latch.try_enter();
        assert!(latch.is_entered());

        drop(guard);
        assert!(latch.try_enter().is_ok());
    }

    #[test]
    fn test_release_on_error_path() {
        let latch = ReentrancyLatch::new();

        let result: Result<(), TokenError> = (|| {
            let _guard = latch.try_enter()?;
            Err(TokenError::InsufficientBalance)
        })();

        assert_eq!(result, Err(TokenError::InsufficientBalance));
        assert!(!latch.is_entered(), "latch must release when the body fails");
    }
}
