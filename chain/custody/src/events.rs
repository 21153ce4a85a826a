//! Bank events
//!
//! Events are immutable records appended by bank operations. They are the
//! primary observability channel: every deposit, withdrawal transition,
//! reward, and cap rejection leaves one. Event emission never affects
//! ledger state.

use serde::{Deserialize, Serialize};
use std::fmt;
use types::asset::{format_quote_units, AssetKind};
use types::ids::Address;

/// Deposit credited to an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceived {
    pub account: Address,
    pub kind: AssetKind,
    pub amount: u128,
    pub quote_value: u128,
}

/// Deposit rejected because it would push the aggregate valuation over the cap
///
/// Recorded on the failing call; no ledger state is mutated alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositCapReached {
    pub account: Address,
    pub attempted_quote_value: u128,
    pub aggregate_quote_value: u128,
    pub cap: u128,
}

/// Withdrawal requested; funds moved from the live balance into reservation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequested {
    pub account: Address,
    pub kind: AssetKind,
    pub amount: u128,
    /// Reserved total after this request (requests accumulate)
    pub pending_total: u128,
}

/// Withdrawal completed; the full reservation settled externally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalCompleted {
    pub account: Address,
    pub kind: AssetKind,
    pub amount: u128,
}

/// One-time loyalty credential issued to an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEarned {
    pub account: Address,
    pub credential_id: u64,
    pub cumulative_quote_value: u128,
}

/// Owner-directed withdrawal bypassing the two-phase protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyWithdrawal {
    pub recipient: Address,
    pub kind: AssetKind,
    pub amount: u128,
}

/// Enum wrapper for all bank events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BankEvent {
    DepositReceived(DepositReceived),
    DepositCapReached(DepositCapReached),
    WithdrawalRequested(WithdrawalRequested),
    WithdrawalCompleted(WithdrawalCompleted),
    RewardEarned(RewardEarned),
    EmergencyWithdrawal(EmergencyWithdrawal),
}

impl fmt::Display for BankEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BankEvent::DepositReceived(e) => write!(
                f,
                "deposit: {} credited {} {} worth {} quote",
                e.account,
                e.kind.format_base_units(e.amount),
                e.kind,
                format_quote_units(e.quote_value)
            ),
            BankEvent::DepositCapReached(e) => write!(
                f,
                "cap reached: {} attempted {} quote against aggregate {} (cap {})",
                e.account,
                format_quote_units(e.attempted_quote_value),
                format_quote_units(e.aggregate_quote_value),
                format_quote_units(e.cap)
            ),
            BankEvent::WithdrawalRequested(e) => write!(
                f,
                "withdrawal requested: {} reserved {} {} (pending total {})",
                e.account,
                e.kind.format_base_units(e.amount),
                e.kind,
                e.kind.format_base_units(e.pending_total)
            ),
            BankEvent::WithdrawalCompleted(e) => write!(
                f,
                "withdrawal completed: {} received {} {}",
                e.account,
                e.kind.format_base_units(e.amount),
                e.kind
            ),
            BankEvent::RewardEarned(e) => write!(
                f,
                "reward earned: {} issued credential {} at cumulative {} quote",
                e.account,
                e.credential_id,
                format_quote_units(e.cumulative_quote_value)
            ),
            BankEvent::EmergencyWithdrawal(e) => write!(
                f,
                "emergency withdrawal: {} {} sent to {}",
                e.kind.format_base_units(e.amount),
                e.kind,
                e.recipient
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_received_serialization() {
        let event = DepositReceived {
            account: Address::new("alice"),
            kind: AssetKind::Native,
            amount: 100_000_000_000_000_000, // 0.1 native
            quote_value: 20_000_000_000,     // 200 quote units
        };
        let json = serde_json::to_string(&event).unwrap();
        let deser: DepositReceived = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_bank_event_enum_variant() {
        let event = BankEvent::WithdrawalRequested(WithdrawalRequested {
            account: Address::new("bob"),
            kind: AssetKind::External,
            amount: 500_000_000,
            pending_total: 500_000_000,
        });
        assert!(matches!(event, BankEvent::WithdrawalRequested(_)));
    }

    #[test]
    fn test_reward_earned_serialization() {
        let event = BankEvent::RewardEarned(RewardEarned {
            account: Address::new("alice"),
            credential_id: 7,
            cumulative_quote_value: 100_000_000_000,
        });
        let json = serde_json::to_string(&event).unwrap();
        let deser: BankEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_display_renders_scaled_amounts() {
        let event = BankEvent::DepositReceived(DepositReceived {
            account: Address::new("alice"),
            kind: AssetKind::Native,
            amount: 100_000_000_000_000_000,
            quote_value: 20_000_000_000,
        });
        let rendered = event.to_string();
        assert!(rendered.contains("0.1"));
        assert!(rendered.contains("200"));
    }
}
