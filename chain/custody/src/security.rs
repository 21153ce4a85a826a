//! Shared security primitives
//!
//! Serialization and authorization guards wrapping every state-mutating
//! entry point of the bank.

use crate::errors::BankError;
use types::ids::Address;

/// Reentrancy guard serializing mutating entry points.
///
/// The guard is held for the full span of a mutating call, including the
/// windows during which control is suspended to untrusted collaborators
/// (price query, asset transfers, reward issuance). A nested attempt to
/// enter while held fails immediately; it never waits.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    held: bool,
}

impl ReentrancyGuard {
    /// Create a new released guard.
    pub fn new() -> Self {
        Self { held: false }
    }

    /// Acquire the guard. Returns `false` if already held (reentrancy attempt).
    pub fn try_acquire(&mut self) -> bool {
        if self.held {
            return false;
        }
        self.held = true;
        true
    }

    /// Release the guard. Must run on every exit path of a guarded call.
    pub fn release(&mut self) {
        self.held = false;
    }

    /// Check if currently held.
    pub fn is_held(&self) -> bool {
        self.held
    }
}

/// Fixed owner identity gating administrative operations.
///
/// The owner is set once at construction and never rotated.
#[derive(Debug, Clone)]
pub struct Ownership {
    owner: Address,
}

impl Ownership {
    /// Create ownership bound to a fixed owner.
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    /// Get the owner identity.
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Check whether a caller is the owner.
    pub fn is_owner(&self, caller: &Address) -> bool {
        caller == &self.owner
    }

    /// Fail with `Unauthorized` unless the caller is the owner.
    pub fn ensure_owner(&self, caller: &Address) -> Result<(), BankError> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(BankError::Unauthorized)
        }
    }
}
