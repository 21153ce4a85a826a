//! Bank controller
//!
//! Orchestrates the deposit flow, cap enforcement, the one-time reward
//! trigger, owner-only administration, and read-only queries over the
//! account ledger. Every mutating entry point runs under the reentrancy
//! guard, and every failure leaves ledger state exactly as it found it:
//! all fallible steps happen before the first irreversible write.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use types::asset::AssetKind;
use types::ids::Address;

use crate::errors::BankError;
use crate::events::{
    BankEvent, DepositCapReached, DepositReceived, EmergencyWithdrawal, RewardEarned,
};
use crate::interfaces::{NativeAssetLedger, PriceOracle, RewardIssuer, StableAssetLedger};
use crate::ledger::{Account, AccountLedger};
use crate::security::{Ownership, ReentrancyGuard};
use crate::valuation::{self, REWARD_THRESHOLD};

/// Credential reference handed to the reward issuer.
pub const LOYALTY_CREDENTIAL: &str = "loyalty/premier-depositor";

/// Construction-time parameters, fixed for the bank's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankConfig {
    /// Owner identity gating administrative operations. Never rotated.
    pub owner: Address,
    /// The bank's own custody address, the recipient of pulled stable funds.
    pub address: Address,
    /// Aggregate lifetime-valuation cap, quote base units.
    pub deposit_cap: u128,
    /// Per-request withdrawal maximum, native-asset base units, applied
    /// identically to both asset kinds.
    pub max_withdrawal_per_request: u128,
}

/// Aggregate bank statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankStats {
    pub deposit_ops: u64,
    pub withdrawal_ops: u64,
    pub native_custody: u128,
    pub registered_accounts: usize,
}

/// The custodial bank.
///
/// Owns the account ledger, the security guards, the collaborator handles,
/// and the event log. Collaborators are injected at construction; the
/// price feed and reward issuer can be swapped by the owner afterwards.
pub struct Bank {
    pub(crate) config: BankConfig,
    pub(crate) ledger: AccountLedger,
    pub(crate) guard: ReentrancyGuard,
    pub(crate) ownership: Ownership,
    pub(crate) oracle: Box<dyn PriceOracle>,
    pub(crate) stable: Box<dyn StableAssetLedger>,
    pub(crate) native: Box<dyn NativeAssetLedger>,
    pub(crate) reward_issuer: Option<Box<dyn RewardIssuer>>,
    pub(crate) native_custody: u128,
    pub(crate) external_custody: u128,
    pub(crate) deposit_ops: u64,
    pub(crate) withdrawal_ops: u64,
    pub(crate) events: Vec<BankEvent>,
}

impl Bank {
    /// Create a new bank. No reward issuer is configured initially.
    pub fn new(
        config: BankConfig,
        oracle: Box<dyn PriceOracle>,
        stable: Box<dyn StableAssetLedger>,
        native: Box<dyn NativeAssetLedger>,
    ) -> Self {
        let ownership = Ownership::new(config.owner.clone());
        Self {
            config,
            ledger: AccountLedger::new(),
            guard: ReentrancyGuard::new(),
            ownership,
            oracle,
            stable,
            native,
            reward_issuer: None,
            native_custody: 0,
            external_custody: 0,
            deposit_ops: 0,
            withdrawal_ops: 0,
            events: Vec::new(),
        }
    }

    /// Run a mutating operation under the reentrancy guard.
    ///
    /// The guard is released on every exit path, success or failure.
    pub(crate) fn non_reentrant<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, BankError>,
    ) -> Result<T, BankError> {
        if !self.guard.try_acquire() {
            return Err(BankError::ReentrantCall);
        }
        let outcome = op(self);
        self.guard.release();
        outcome
    }

    // ───────────────────────── Deposits ─────────────────────────

    /// Deposit native asset arriving with the call.
    pub fn deposit_native(&mut self, caller: &Address, amount: u128) -> Result<(), BankError> {
        self.non_reentrant(|bank| {
            if amount == 0 {
                return Err(BankError::ZeroAmount);
            }
            let price = bank.oracle.latest_answer();
            let quote_value = valuation::native_quote_value(amount, price)?;
            bank.check_cap(caller, quote_value)?;
            let new_custody = bank
                .native_custody
                .checked_add(amount)
                .ok_or(BankError::Overflow)?;

            bank.ledger
                .credit(caller, AssetKind::Native, amount, quote_value)?;
            bank.native_custody = new_custody;
            bank.deposit_ops += 1;
            bank.events.push(BankEvent::DepositReceived(DepositReceived {
                account: caller.clone(),
                kind: AssetKind::Native,
                amount,
                quote_value,
            }));
            bank.try_issue_reward(caller);
            Ok(())
        })
    }

    /// Deposit stable asset, pulled from the caller via the external ledger.
    pub fn deposit_external(&mut self, caller: &Address, amount: u128) -> Result<(), BankError> {
        self.non_reentrant(|bank| {
            if amount == 0 {
                return Err(BankError::ZeroAmount);
            }
            let quote_value = valuation::external_quote_value(amount)?;
            bank.check_cap(caller, quote_value)?;
            let new_custody = bank
                .external_custody
                .checked_add(amount)
                .ok_or(BankError::Overflow)?;
            // No fallible step may follow the pull.
            let snapshot = bank.ledger.account(caller);
            if snapshot.external_balance.checked_add(amount).is_none()
                || snapshot
                    .cumulative_quote_value
                    .checked_add(quote_value)
                    .is_none()
            {
                return Err(BankError::Overflow);
            }

            let custody_address = bank.config.address.clone();
            match bank.stable.transfer_from(caller, &custody_address, amount) {
                Ok(true) => {}
                Ok(false) | Err(_) => {
                    return Err(BankError::ExternalTransferFailed {
                        kind: AssetKind::External,
                    })
                }
            }

            bank.ledger
                .credit(caller, AssetKind::External, amount, quote_value)?;
            bank.external_custody = new_custody;
            bank.deposit_ops += 1;
            bank.events.push(BankEvent::DepositReceived(DepositReceived {
                account: caller.clone(),
                kind: AssetKind::External,
                amount,
                quote_value,
            }));
            bank.try_issue_reward(caller);
            Ok(())
        })
    }

    /// Fail with `ExceedsCap`, recording the rejection, if crediting
    /// `quote_value` would push the aggregate lifetime valuation over the
    /// cap. The aggregate is recomputed from the registration roll on
    /// every deposit.
    fn check_cap(&mut self, account: &Address, quote_value: u128) -> Result<(), BankError> {
        let aggregate = self.ledger.aggregate_quote_value();
        let over = aggregate
            .checked_add(quote_value)
            .map_or(true, |total| total > self.config.deposit_cap);
        if over {
            self.events
                .push(BankEvent::DepositCapReached(DepositCapReached {
                    account: account.clone(),
                    attempted_quote_value: quote_value,
                    aggregate_quote_value: aggregate,
                    cap: self.config.deposit_cap,
                }));
            return Err(BankError::ExceedsCap {
                attempted: quote_value,
                cap: self.config.deposit_cap,
            });
        }
        Ok(())
    }

    // ───────────────────────── Reward ─────────────────────────

    /// Issue the one-time loyalty credential if the account just crossed
    /// the threshold. The latch is set before the issuance attempt; a
    /// failed issuance leaves the account marked with no credential and
    /// no retry path.
    fn try_issue_reward(&mut self, account: &Address) {
        if self.reward_issuer.is_none() {
            return;
        }
        let snapshot = self.ledger.account(account);
        if snapshot.rewarded || snapshot.cumulative_quote_value < REWARD_THRESHOLD {
            return;
        }
        self.ledger.mark_rewarded(account);
        let outcome = self
            .reward_issuer
            .as_mut()
            .map(|issuer| issuer.issue(account, LOYALTY_CREDENTIAL));
        match outcome {
            Some(Ok(credential_id)) => {
                self.events.push(BankEvent::RewardEarned(RewardEarned {
                    account: account.clone(),
                    credential_id,
                    cumulative_quote_value: snapshot.cumulative_quote_value,
                }));
            }
            Some(Err(failure)) => {
                warn!(
                    account = %account,
                    error = %failure,
                    "reward issuance failed; account stays marked rewarded"
                );
            }
            None => {}
        }
    }

    // ───────────────────────── Settlement ─────────────────────────

    /// Push `amount` of `kind` out of custody to `recipient`. Both a
    /// reverted call and a false-reporting transfer surface as
    /// `ExternalTransferFailed`.
    pub(crate) fn settle(
        &mut self,
        kind: AssetKind,
        recipient: &Address,
        amount: u128,
    ) -> Result<(), BankError> {
        match kind {
            AssetKind::Native => self
                .native
                .transfer(recipient, amount)
                .map_err(|_| BankError::ExternalTransferFailed { kind })?,
            AssetKind::External => match self.stable.transfer(recipient, amount) {
                Ok(true) => {}
                Ok(false) | Err(_) => return Err(BankError::ExternalTransferFailed { kind }),
            },
        }
        Ok(())
    }

    pub(crate) fn custody(&self, kind: AssetKind) -> u128 {
        match kind {
            AssetKind::Native => self.native_custody,
            AssetKind::External => self.external_custody,
        }
    }

    pub(crate) fn set_custody(&mut self, kind: AssetKind, value: u128) {
        match kind {
            AssetKind::Native => self.native_custody = value,
            AssetKind::External => self.external_custody = value,
        }
    }

    // ───────────────────────── Administration ─────────────────────────

    /// Swap the price feed. Owner-only.
    pub fn rotate_price_feed(
        &mut self,
        caller: &Address,
        oracle: Box<dyn PriceOracle>,
    ) -> Result<(), BankError> {
        self.non_reentrant(|bank| {
            bank.ownership.ensure_owner(caller)?;
            bank.oracle = oracle;
            debug!(caller = %caller, "price feed rotated");
            Ok(())
        })
    }

    /// Configure the reward issuer. Owner-only.
    pub fn set_reward_issuer(
        &mut self,
        caller: &Address,
        issuer: Box<dyn RewardIssuer>,
    ) -> Result<(), BankError> {
        self.non_reentrant(|bank| {
            bank.ownership.ensure_owner(caller)?;
            bank.reward_issuer = Some(issuer);
            debug!(caller = %caller, "reward issuer configured");
            Ok(())
        })
    }

    /// Push either asset to an arbitrary recipient, bypassing the
    /// two-phase protocol. Owner-only. Debits custody; per-account
    /// balances are untouched.
    pub fn emergency_withdraw(
        &mut self,
        caller: &Address,
        kind: AssetKind,
        recipient: &Address,
        amount: u128,
    ) -> Result<(), BankError> {
        self.non_reentrant(|bank| {
            bank.ownership.ensure_owner(caller)?;
            if amount == 0 {
                return Err(BankError::ZeroAmount);
            }
            let custody = bank.custody(kind);
            let new_custody = custody
                .checked_sub(amount)
                .ok_or(BankError::InsufficientBalance {
                    kind,
                    requested: amount,
                    available: custody,
                })?;
            bank.settle(kind, recipient, amount)?;
            bank.set_custody(kind, new_custody);
            bank.events
                .push(BankEvent::EmergencyWithdrawal(EmergencyWithdrawal {
                    recipient: recipient.clone(),
                    kind,
                    amount,
                }));
            debug!(caller = %caller, recipient = %recipient, %kind, %amount, "emergency withdrawal");
            Ok(())
        })
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Snapshot of one account: balances, lifetime valuation, pending
    /// reservations, and the reward latch.
    pub fn account_snapshot(&self, account: &Address) -> Account {
        self.ledger.account(account)
    }

    /// Aggregate bank statistics.
    pub fn stats(&self) -> BankStats {
        BankStats {
            deposit_ops: self.deposit_ops,
            withdrawal_ops: self.withdrawal_ops,
            native_custody: self.native_custody,
            registered_accounts: self.ledger.registered_count(),
        }
    }

    /// Current native-asset price as reported by the configured feed.
    pub fn native_price(&self) -> i64 {
        self.oracle.latest_answer()
    }

    /// Number of accounts on the registration roll.
    pub fn registered_account_count(&self) -> usize {
        self.ledger.registered_count()
    }

    /// The registration roll, in first-credit order.
    pub fn registered_accounts(&self) -> &[Address] {
        self.ledger.registered_accounts()
    }

    /// The bank owner.
    pub fn owner(&self) -> &Address {
        self.ownership.owner()
    }

    /// Construction-time configuration.
    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[BankEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<BankEvent> {
        std::mem::take(&mut self.events)
    }
}
