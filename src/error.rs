//! Unified error type for the token engine

use ledger_model::LedgerError;
use router_adapter::RouterError;
use thiserror::Error;

/// Every fallible engine operation returns this type. A returned error
/// always means the whole operation was aborted with no partial state
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Caller lacks the required privilege
    #[error("caller is not the owner")]
    Unauthorized,

    /// Null identifier (or malformed argument) where a valid one is required
    #[error("invalid argument: null identifier")]
    InvalidArgument,

    /// Debit larger than the caller's balance
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Delegated transfer larger than the remaining allowance
    #[error("allowance exceeded")]
    AllowanceExceeded,

    /// Issuance attempted at or after the mint deadline
    #[error("mint window has closed")]
    MintWindowClosed,

    /// Guarded operation entered while another one is in progress
    #[error("reentrant call")]
    ReentrantCall,

    /// The router call did not succeed; any staged debit was unwound
    #[error("router call failed: {0}")]
    ExternalCallFailed(RouterError),

    /// Arithmetic overflow (including a router receipt that does not add up)
    #[error("arithmetic overflow")]
    Overflow,
}

impl From<LedgerError> for TokenError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ZeroAddress => Self::InvalidArgument,
            LedgerError::InsufficientBalance => Self::InsufficientBalance,
            LedgerError::AllowanceExceeded => Self::AllowanceExceeded,
            LedgerError::Overflow => Self::Overflow,
        }
    }
}

impl From<RouterError> for TokenError {
    fn from(err: RouterError) -> Self {
        Self::ExternalCallFailed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_error_mapping() {
        assert_eq!(
            TokenError::from(LedgerError::ZeroAddress),
            TokenError::InvalidArgument
        );
        assert_eq!(
            TokenError::from(LedgerError::AllowanceExceeded),
            TokenError::AllowanceExceeded
        );
    }

    #[test]
    fn test_router_error_carries_cause() {
        let err = TokenError::from(RouterError::Expired);
        assert_eq!(err, TokenError::ExternalCallFailed(RouterError::Expired));
        assert_eq!(err.to_string(), "router call failed: deadline expired");
    }
}
