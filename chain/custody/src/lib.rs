//! Custodial Bank Logic
//!
//! This crate implements the contract layer of the custodial bank: a
//! multi-asset ledger that accepts deposits of the native asset and one
//! externally-issued stable asset, values both in a common quote currency
//! through a price feed, enforces an aggregate deposit cap, and releases
//! funds through a two-phase withdrawal protocol.
//!
//! # Modules
//! - `errors`: Bank-specific error types
//! - `events`: Typed event log emitted by bank operations
//! - `security`: Shared security primitives (reentrancy guard, ownership)
//! - `interfaces`: Collaborator traits (price feed, asset ledgers, reward issuer)
//! - `valuation`: Decimal scales and quote-value arithmetic
//! - `ledger`: Per-account balances, reservations, and the registration roll
//! - `bank`: The controller: deposits, reward trigger, administration, queries
//! - `withdrawal`: The two-phase withdrawal protocol
//!
//! # Version
//! v0.1.0 — Initial implementation

pub mod bank;
pub mod errors;
pub mod events;
pub mod interfaces;
pub mod ledger;
pub mod security;
pub mod valuation;
pub mod withdrawal;

/// Bank ABI version — frozen after release
pub const BANK_ABI_VERSION: &str = "1.0.0";
