//! Collaborator interfaces
//!
//! The bank suspends to untrusted code at exactly four seams: the price
//! query, the stable-asset pull/push transfers, the native push settlement,
//! and the reward issuance. Each seam is a typed trait. An `Err(CallFailure)`
//! models a call that reverted outright; a transfer returning `Ok(false)`
//! models a call that completed but reported failure. The controller maps
//! both transfer outcomes to `ExternalTransferFailed`.

use thiserror::Error;
use types::ids::Address;

/// A call into an external contract that reverted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("External call reverted: {reason}")]
pub struct CallFailure {
    pub reason: String,
}

impl CallFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Price feed for the native asset.
pub trait PriceOracle {
    /// Latest quote-currency price of one whole native unit, scaled by 10^8.
    ///
    /// A non-positive answer is rejected by the caller as `InvalidPrice`.
    fn latest_answer(&self) -> i64;
}

/// The externally-issued stable asset's fungible ledger.
pub trait StableAssetLedger {
    /// Pull-style transfer: move `amount` from `owner` to `recipient`.
    fn transfer_from(
        &mut self,
        owner: &Address,
        recipient: &Address,
        amount: u128,
    ) -> Result<bool, CallFailure>;

    /// Push-style transfer out of the caller's own holdings.
    fn transfer(&mut self, recipient: &Address, amount: u128) -> Result<bool, CallFailure>;
}

/// Settlement hook pushing native asset out of the bank's custody.
pub trait NativeAssetLedger {
    fn transfer(&mut self, recipient: &Address, amount: u128) -> Result<(), CallFailure>;
}

/// Non-fungible credential registry issuing the loyalty reward.
pub trait RewardIssuer {
    /// Issue a credential to `recipient`; returns the credential identifier.
    fn issue(&mut self, recipient: &Address, credential: &str) -> Result<u64, CallFailure>;
}

pub mod testing {
    //! In-memory collaborator doubles shared by unit and integration tests.
    //!
    //! State is held behind `Rc<RefCell<…>>` so a test keeps a handle (via
    //! `Clone`) after boxing the double into the bank.

    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Oracle answering a settable static price and counting queries.
    #[derive(Debug, Clone)]
    pub struct StaticOracle {
        price: Rc<Cell<i64>>,
        calls: Rc<Cell<u64>>,
    }

    impl StaticOracle {
        pub fn new(price: i64) -> Self {
            Self {
                price: Rc::new(Cell::new(price)),
                calls: Rc::new(Cell::new(0)),
            }
        }

        pub fn set_price(&self, price: i64) {
            self.price.set(price);
        }

        /// Number of `latest_answer` queries served.
        pub fn calls(&self) -> u64 {
            self.calls.get()
        }
    }

    impl PriceOracle for StaticOracle {
        fn latest_answer(&self) -> i64 {
            self.calls.set(self.calls.get() + 1);
            self.price.get()
        }
    }

    /// Stable-asset ledger tracking per-holder balances, including the
    /// bank's own custody address. Insufficient funds report `Ok(false)`.
    #[derive(Debug, Clone)]
    pub struct InMemoryStableLedger {
        bank: Address,
        balances: Rc<RefCell<HashMap<Address, u128>>>,
    }

    impl InMemoryStableLedger {
        pub fn new(bank: Address) -> Self {
            Self {
                bank,
                balances: Rc::new(RefCell::new(HashMap::new())),
            }
        }

        pub fn mint(&self, holder: &Address, amount: u128) {
            *self.balances.borrow_mut().entry(holder.clone()).or_insert(0) += amount;
        }

        pub fn balance_of(&self, holder: &Address) -> u128 {
            self.balances.borrow().get(holder).copied().unwrap_or(0)
        }

        fn shift(&self, from: &Address, to: &Address, amount: u128) -> bool {
            let mut balances = self.balances.borrow_mut();
            let held = balances.get(from).copied().unwrap_or(0);
            if held < amount {
                return false;
            }
            balances.insert(from.clone(), held - amount);
            *balances.entry(to.clone()).or_insert(0) += amount;
            true
        }
    }

    impl StableAssetLedger for InMemoryStableLedger {
        fn transfer_from(
            &mut self,
            owner: &Address,
            recipient: &Address,
            amount: u128,
        ) -> Result<bool, CallFailure> {
            Ok(self.shift(owner, recipient, amount))
        }

        fn transfer(&mut self, recipient: &Address, amount: u128) -> Result<bool, CallFailure> {
            let bank = self.bank.clone();
            Ok(self.shift(&bank, recipient, amount))
        }
    }

    /// Stable ledger that accepts pulls but whose every push completes
    /// while reporting failure.
    #[derive(Debug, Default, Clone)]
    pub struct PushRefusingStableLedger;

    impl StableAssetLedger for PushRefusingStableLedger {
        fn transfer_from(
            &mut self,
            _owner: &Address,
            _recipient: &Address,
            _amount: u128,
        ) -> Result<bool, CallFailure> {
            Ok(true)
        }

        fn transfer(&mut self, _recipient: &Address, _amount: u128) -> Result<bool, CallFailure> {
            Ok(false)
        }
    }

    /// Stable ledger whose every transfer reverts.
    #[derive(Debug, Default, Clone)]
    pub struct RevertingStableLedger;

    impl StableAssetLedger for RevertingStableLedger {
        fn transfer_from(
            &mut self,
            _owner: &Address,
            _recipient: &Address,
            _amount: u128,
        ) -> Result<bool, CallFailure> {
            Err(CallFailure::new("transferFrom reverted"))
        }

        fn transfer(&mut self, _recipient: &Address, _amount: u128) -> Result<bool, CallFailure> {
            Err(CallFailure::new("transfer reverted"))
        }
    }

    /// Native settlement recording every successful push.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingNativeLedger {
        transfers: Rc<RefCell<Vec<(Address, u128)>>>,
    }

    impl RecordingNativeLedger {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn transfers(&self) -> Vec<(Address, u128)> {
            self.transfers.borrow().clone()
        }

        /// Total pushed to one recipient across all settlements.
        pub fn total_to(&self, recipient: &Address) -> u128 {
            self.transfers
                .borrow()
                .iter()
                .filter(|(to, _)| to == recipient)
                .map(|(_, amount)| amount)
                .sum()
        }
    }

    impl NativeAssetLedger for RecordingNativeLedger {
        fn transfer(&mut self, recipient: &Address, amount: u128) -> Result<(), CallFailure> {
            self.transfers.borrow_mut().push((recipient.clone(), amount));
            Ok(())
        }
    }

    /// Native settlement whose every push reverts (adversarial recipient).
    #[derive(Debug, Default, Clone)]
    pub struct RejectingNativeLedger;

    impl NativeAssetLedger for RejectingNativeLedger {
        fn transfer(&mut self, _recipient: &Address, _amount: u128) -> Result<(), CallFailure> {
            Err(CallFailure::new("recipient rejected native transfer"))
        }
    }

    /// Reward issuer handing out sequential credential ids.
    #[derive(Debug, Clone, Default)]
    pub struct CountingRewardIssuer {
        issued: Rc<RefCell<Vec<(Address, String)>>>,
    }

    impl CountingRewardIssuer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn issued(&self) -> Vec<(Address, String)> {
            self.issued.borrow().clone()
        }

        pub fn issued_count(&self) -> usize {
            self.issued.borrow().len()
        }
    }

    impl RewardIssuer for CountingRewardIssuer {
        fn issue(&mut self, recipient: &Address, credential: &str) -> Result<u64, CallFailure> {
            let mut issued = self.issued.borrow_mut();
            issued.push((recipient.clone(), credential.to_string()));
            Ok(issued.len() as u64)
        }
    }

    /// Reward issuer whose every issuance reverts.
    #[derive(Debug, Default, Clone)]
    pub struct FailingRewardIssuer;

    impl RewardIssuer for FailingRewardIssuer {
        fn issue(&mut self, _recipient: &Address, _credential: &str) -> Result<u64, CallFailure> {
            Err(CallFailure::new("issuance reverted"))
        }
    }
}
