//! Two-phase withdrawal protocol
//!
//! Per (account, asset kind) state machine:
//! `Idle → (request) → Requested → (complete) → Idle`.
//! The request phase reserves funds out of the live balance with no
//! external call; the completion phase performs the external settlement
//! and zeroes the reservation in full. Repeated requests accumulate into
//! a single pending total; requests carry no identity of their own.
//! Splitting the protocol this way keeps the ledger mutation and the
//! untrusted settlement call in separate state transitions.

use serde::{Deserialize, Serialize};
use types::asset::AssetKind;
use types::ids::Address;

use crate::bank::Bank;
use crate::errors::BankError;
use crate::events::{BankEvent, WithdrawalCompleted, WithdrawalRequested};

/// Observable state of one (account, asset kind) withdrawal lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawalPhase {
    /// No reservation outstanding
    Idle,
    /// A reservation awaits completion
    Requested,
}

impl Bank {
    /// Reserve `amount` of `kind` for later completion.
    ///
    /// Fails with `ZeroAmount`, `InsufficientBalance`, or
    /// `ExceedsMaxWithdrawal`, in that precedence; a failed request
    /// changes nothing.
    pub fn request_withdrawal(
        &mut self,
        caller: &Address,
        kind: AssetKind,
        amount: u128,
    ) -> Result<(), BankError> {
        self.non_reentrant(|bank| {
            if amount == 0 {
                return Err(BankError::ZeroAmount);
            }
            let available = bank.ledger.balance(caller, kind);
            if amount > available {
                return Err(BankError::InsufficientBalance {
                    kind,
                    requested: amount,
                    available,
                });
            }
            let max = bank.config.max_withdrawal_per_request;
            if amount > max {
                return Err(BankError::ExceedsMaxWithdrawal {
                    requested: amount,
                    max,
                });
            }

            bank.ledger.reserve_for_withdrawal(caller, kind, amount)?;
            bank.withdrawal_ops += 1;
            let pending_total = bank.ledger.pending(caller, kind);
            bank.events
                .push(BankEvent::WithdrawalRequested(WithdrawalRequested {
                    account: caller.clone(),
                    kind,
                    amount,
                    pending_total,
                }));
            Ok(())
        })
    }

    /// Settle the caller's full outstanding reservation of `kind`
    /// externally and return the amount moved.
    ///
    /// Fails with `NothingPending` when no reservation exists. A failed
    /// settlement leaves the reservation and all other state exactly as
    /// before the call; the reservation is zeroed only after the external
    /// transfer succeeds.
    pub fn complete_withdrawal(
        &mut self,
        caller: &Address,
        kind: AssetKind,
    ) -> Result<u128, BankError> {
        self.non_reentrant(|bank| {
            let pending = bank.ledger.pending(caller, kind);
            if pending == 0 {
                return Err(BankError::NothingPending { kind });
            }
            // Custody drained below the reservation (emergency withdrawal)
            // cannot fund the settlement.
            let new_custody = bank
                .custody(kind)
                .checked_sub(pending)
                .ok_or(BankError::ExternalTransferFailed { kind })?;

            bank.settle(kind, caller, pending)?;

            let released = bank.ledger.release_pending(caller, kind)?;
            bank.set_custody(kind, new_custody);
            bank.events
                .push(BankEvent::WithdrawalCompleted(WithdrawalCompleted {
                    account: caller.clone(),
                    kind,
                    amount: released,
                }));
            Ok(released)
        })
    }

    /// Observable phase of one (account, asset kind) withdrawal lane.
    pub fn withdrawal_phase(&self, account: &Address, kind: AssetKind) -> WithdrawalPhase {
        if self.ledger.pending(account, kind) == 0 {
            WithdrawalPhase::Idle
        } else {
            WithdrawalPhase::Requested
        }
    }
}
