//! Bank-specific error types
//!
//! Error taxonomy for deposit, valuation, withdrawal, and administrative
//! operations. Every failure is surfaced synchronously and leaves ledger
//! state untouched; nothing is retried internally.

use thiserror::Error;
use types::asset::AssetKind;

/// Bank operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    #[error("Amount must be nonzero")]
    ZeroAmount,

    #[error("Deposit of {attempted} quote units would push the aggregate over the cap of {cap}")]
    ExceedsCap { attempted: u128, cap: u128 },

    #[error("Withdrawal of {requested} exceeds the per-request maximum of {max}")]
    ExceedsMaxWithdrawal { requested: u128, max: u128 },

    #[error("Insufficient {kind} balance: requested {requested}, available {available}")]
    InsufficientBalance {
        kind: AssetKind,
        requested: u128,
        available: u128,
    },

    #[error("No pending {kind} withdrawal to complete")]
    NothingPending { kind: AssetKind },

    #[error("Unauthorized: caller is not the bank owner")]
    Unauthorized,

    #[error("Reentrant call rejected")]
    ReentrantCall,

    #[error("External {kind} transfer failed")]
    ExternalTransferFailed { kind: AssetKind },

    #[error("Price feed returned a non-positive price: {price}")]
    InvalidPrice { price: i64 },

    #[error("Arithmetic overflow in balance or valuation update")]
    Overflow,
}
