//! Account ledger
//!
//! The central data structure: per-account balances, pending withdrawal
//! reservations, lifetime deposit valuation, and the registration roll.
//! The ledger performs no cap enforcement and no external calls; both are
//! the controller's responsibility.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use types::asset::AssetKind;
use types::ids::Address;

use crate::errors::BankError;

/// Per-account balance record.
///
/// `cumulative_quote_value` is a lifetime deposit counter: it grows with
/// every credit and is never reduced by withdrawals. Cap enforcement and
/// the reward trigger read this field, not the live balances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub native_balance: u128,
    pub external_balance: u128,
    pub cumulative_quote_value: u128,
    pub pending_native_withdrawal: u128,
    pub pending_external_withdrawal: u128,
    pub rewarded: bool,
}

impl Account {
    /// Live balance for one asset kind.
    pub fn balance(&self, kind: AssetKind) -> u128 {
        match kind {
            AssetKind::Native => self.native_balance,
            AssetKind::External => self.external_balance,
        }
    }

    /// Reserved (pending-withdrawal) amount for one asset kind.
    pub fn pending(&self, kind: AssetKind) -> u128 {
        match kind {
            AssetKind::Native => self.pending_native_withdrawal,
            AssetKind::External => self.pending_external_withdrawal,
        }
    }

    fn balance_mut(&mut self, kind: AssetKind) -> &mut u128 {
        match kind {
            AssetKind::Native => &mut self.native_balance,
            AssetKind::External => &mut self.external_balance,
        }
    }

    fn pending_mut(&mut self, kind: AssetKind) -> &mut u128 {
        match kind {
            AssetKind::Native => &mut self.pending_native_withdrawal,
            AssetKind::External => &mut self.pending_external_withdrawal,
        }
    }
}

/// Map of per-account records plus the append-only registration roll.
///
/// Accounts are created lazily with default values on first access and
/// never destroyed. An address enters the roll exactly once, at the credit
/// that takes its `cumulative_quote_value` from zero to nonzero.
#[derive(Debug, Default)]
pub struct AccountLedger {
    accounts: HashMap<Address, Account>,
    registered: Vec<Address>,
}

impl AccountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a deposit: add `amount` to the asset balance and
    /// `quote_value` to the lifetime valuation.
    ///
    /// Registers the account if this credit moves its lifetime valuation
    /// from zero to nonzero. Cap enforcement happens before this call.
    pub fn credit(
        &mut self,
        account: &Address,
        kind: AssetKind,
        amount: u128,
        quote_value: u128,
    ) -> Result<(), BankError> {
        let entry = self.accounts.entry(account.clone()).or_default();
        let new_balance = entry
            .balance(kind)
            .checked_add(amount)
            .ok_or(BankError::Overflow)?;
        let new_cumulative = entry
            .cumulative_quote_value
            .checked_add(quote_value)
            .ok_or(BankError::Overflow)?;
        let first_credit = entry.cumulative_quote_value == 0 && new_cumulative > 0;

        *entry.balance_mut(kind) = new_balance;
        entry.cumulative_quote_value = new_cumulative;
        if first_credit {
            self.registered.push(account.clone());
        }
        Ok(())
    }

    /// Move `amount` from the live balance into the pending-withdrawal
    /// reservation. Fails with `InsufficientBalance` if the live balance
    /// cannot cover it; the account is then unchanged.
    pub fn reserve_for_withdrawal(
        &mut self,
        account: &Address,
        kind: AssetKind,
        amount: u128,
    ) -> Result<(), BankError> {
        let entry = self.accounts.entry(account.clone()).or_default();
        let available = entry.balance(kind);
        if amount > available {
            return Err(BankError::InsufficientBalance {
                kind,
                requested: amount,
                available,
            });
        }
        let new_pending = entry
            .pending(kind)
            .checked_add(amount)
            .ok_or(BankError::Overflow)?;
        *entry.balance_mut(kind) = available - amount;
        *entry.pending_mut(kind) = new_pending;
        Ok(())
    }

    /// Zero the pending reservation and return its full amount for the
    /// caller to settle externally. Fails with `NothingPending` when zero.
    pub fn release_pending(&mut self, account: &Address, kind: AssetKind) -> Result<u128, BankError> {
        let entry = self
            .accounts
            .get_mut(account)
            .ok_or(BankError::NothingPending { kind })?;
        let pending = entry.pending(kind);
        if pending == 0 {
            return Err(BankError::NothingPending { kind });
        }
        *entry.pending_mut(kind) = 0;
        Ok(pending)
    }

    /// Latch the one-time reward flag. Idempotent; never cleared.
    pub fn mark_rewarded(&mut self, account: &Address) {
        self.accounts.entry(account.clone()).or_default().rewarded = true;
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Snapshot of an account (default-valued if never touched).
    pub fn account(&self, account: &Address) -> Account {
        self.accounts.get(account).cloned().unwrap_or_default()
    }

    /// Live balance for one account and asset kind.
    pub fn balance(&self, account: &Address, kind: AssetKind) -> u128 {
        self.accounts
            .get(account)
            .map(|a| a.balance(kind))
            .unwrap_or(0)
    }

    /// Pending reservation for one account and asset kind.
    pub fn pending(&self, account: &Address, kind: AssetKind) -> u128 {
        self.accounts
            .get(account)
            .map(|a| a.pending(kind))
            .unwrap_or(0)
    }

    /// Aggregate lifetime valuation across the registration roll.
    ///
    /// Linear in the number of distinct depositors; recomputed on every
    /// deposit. Saturates at `u128::MAX`, which exceeds any cap.
    pub fn aggregate_quote_value(&self) -> u128 {
        self.registered
            .iter()
            .filter_map(|address| self.accounts.get(address))
            .fold(0u128, |sum, account| {
                sum.saturating_add(account.cumulative_quote_value)
            })
    }

    /// The registration roll, in first-credit order.
    pub fn registered_accounts(&self) -> &[Address] {
        &self.registered
    }

    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address::new("alice")
    }

    // ─── Credit and registration ───

    #[test]
    fn test_credit_updates_balance_and_cumulative() {
        let mut ledger = AccountLedger::new();
        ledger.credit(&alice(), AssetKind::Native, 10, 100).unwrap();
        ledger.credit(&alice(), AssetKind::External, 5, 50).unwrap();

        let account = ledger.account(&alice());
        assert_eq!(account.native_balance, 10);
        assert_eq!(account.external_balance, 5);
        assert_eq!(account.cumulative_quote_value, 150);
    }

    #[test]
    fn test_first_credit_registers_once() {
        let mut ledger = AccountLedger::new();
        ledger.credit(&alice(), AssetKind::Native, 10, 100).unwrap();
        ledger.credit(&alice(), AssetKind::Native, 10, 100).unwrap();

        assert_eq!(ledger.registered_accounts(), &[alice()]);
        assert_eq!(ledger.registered_count(), 1);
    }

    #[test]
    fn test_zero_value_credit_does_not_register() {
        // a credit whose quote value truncated to zero leaves the lifetime
        // valuation at zero, so the account is not yet registered
        let mut ledger = AccountLedger::new();
        ledger.credit(&alice(), AssetKind::Native, 1, 0).unwrap();
        assert_eq!(ledger.registered_count(), 0);
        assert_eq!(ledger.balance(&alice(), AssetKind::Native), 1);

        // the first value-bearing credit registers
        ledger.credit(&alice(), AssetKind::Native, 1, 7).unwrap();
        assert_eq!(ledger.registered_accounts(), &[alice()]);
    }

    #[test]
    fn test_credit_overflow_is_rejected_unchanged() {
        let mut ledger = AccountLedger::new();
        ledger
            .credit(&alice(), AssetKind::Native, u128::MAX, 100)
            .unwrap();
        let before = ledger.account(&alice());

        let result = ledger.credit(&alice(), AssetKind::Native, 1, 1);
        assert_eq!(result, Err(BankError::Overflow));
        assert_eq!(ledger.account(&alice()), before);
    }

    // ─── Reservations ───

    #[test]
    fn test_reserve_moves_balance_to_pending() {
        let mut ledger = AccountLedger::new();
        ledger.credit(&alice(), AssetKind::Native, 10, 100).unwrap();
        ledger
            .reserve_for_withdrawal(&alice(), AssetKind::Native, 4)
            .unwrap();

        let account = ledger.account(&alice());
        assert_eq!(account.native_balance, 6);
        assert_eq!(account.pending_native_withdrawal, 4);
        // lifetime valuation untouched by reservations
        assert_eq!(account.cumulative_quote_value, 100);
    }

    #[test]
    fn test_reserve_accumulates() {
        let mut ledger = AccountLedger::new();
        ledger.credit(&alice(), AssetKind::External, 10, 100).unwrap();
        ledger
            .reserve_for_withdrawal(&alice(), AssetKind::External, 3)
            .unwrap();
        ledger
            .reserve_for_withdrawal(&alice(), AssetKind::External, 2)
            .unwrap();
        assert_eq!(ledger.pending(&alice(), AssetKind::External), 5);
        assert_eq!(ledger.balance(&alice(), AssetKind::External), 5);
    }

    #[test]
    fn test_reserve_insufficient_changes_nothing() {
        let mut ledger = AccountLedger::new();
        ledger.credit(&alice(), AssetKind::Native, 3, 100).unwrap();
        let before = ledger.account(&alice());

        let result = ledger.reserve_for_withdrawal(&alice(), AssetKind::Native, 5);
        assert_eq!(
            result,
            Err(BankError::InsufficientBalance {
                kind: AssetKind::Native,
                requested: 5,
                available: 3,
            })
        );
        assert_eq!(ledger.account(&alice()), before);
    }

    #[test]
    fn test_release_zeroes_in_full() {
        let mut ledger = AccountLedger::new();
        ledger.credit(&alice(), AssetKind::Native, 10, 100).unwrap();
        ledger
            .reserve_for_withdrawal(&alice(), AssetKind::Native, 7)
            .unwrap();

        assert_eq!(ledger.release_pending(&alice(), AssetKind::Native), Ok(7));
        assert_eq!(ledger.pending(&alice(), AssetKind::Native), 0);

        // nothing left to release
        assert_eq!(
            ledger.release_pending(&alice(), AssetKind::Native),
            Err(BankError::NothingPending {
                kind: AssetKind::Native
            })
        );
    }

    #[test]
    fn test_release_untouched_account_fails() {
        let mut ledger = AccountLedger::new();
        assert_eq!(
            ledger.release_pending(&alice(), AssetKind::External),
            Err(BankError::NothingPending {
                kind: AssetKind::External
            })
        );
    }

    // ─── Aggregate and reward latch ───

    #[test]
    fn test_aggregate_sums_registered_accounts() {
        let mut ledger = AccountLedger::new();
        ledger.credit(&alice(), AssetKind::Native, 1, 100).unwrap();
        ledger
            .credit(&Address::new("bob"), AssetKind::External, 1, 40)
            .unwrap();
        assert_eq!(ledger.aggregate_quote_value(), 140);
    }

    #[test]
    fn test_aggregate_unaffected_by_withdrawals() {
        let mut ledger = AccountLedger::new();
        ledger.credit(&alice(), AssetKind::Native, 10, 100).unwrap();
        ledger
            .reserve_for_withdrawal(&alice(), AssetKind::Native, 10)
            .unwrap();
        ledger.release_pending(&alice(), AssetKind::Native).unwrap();
        assert_eq!(ledger.aggregate_quote_value(), 100);
    }

    #[test]
    fn test_mark_rewarded_latches() {
        let mut ledger = AccountLedger::new();
        assert!(!ledger.account(&alice()).rewarded);
        ledger.mark_rewarded(&alice());
        assert!(ledger.account(&alice()).rewarded);
        ledger.mark_rewarded(&alice());
        assert!(ledger.account(&alice()).rewarded);
    }
}
