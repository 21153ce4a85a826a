//! Identity types for bank participants
//!
//! Every participant (depositor, owner, collaborator contract, or the bank
//! itself) is identified by an opaque address string assigned by the host
//! environment. The bank never inspects address contents; it only compares
//! them for equality.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of a bank participant.
///
/// Addresses are opaque and case-sensitive. An empty address is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create a new Address from a string
    ///
    /// # Panics
    /// Panics if the address is empty
    pub fn new(addr: impl Into<String>) -> Self {
        let s = addr.into();
        assert!(!s.is_empty(), "Address must be non-empty");
        Self(s)
    }

    /// Try to create an Address, returning None if invalid
    pub fn try_new(addr: impl Into<String>) -> Option<Self> {
        let s = addr.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Get the address string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
