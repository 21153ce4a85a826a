//! Valuation engine
//!
//! Converts raw asset amounts into quote-currency values under fixed
//! decimal rules: the native asset is valued at the oracle price, the
//! stable asset at its 1:1 peg. All arithmetic is checked `u128`; division
//! truncates and nothing else rounds. Valuation happens once, at deposit
//! time; existing balances are never revalued when prices move.

use crate::errors::BankError;
use types::asset::{pow10, AssetKind, QUOTE_DECIMALS};

/// Cumulative valuation at which the one-time loyalty credential is issued:
/// 1000 whole quote units.
pub const REWARD_THRESHOLD: u128 = 1_000 * pow10(QUOTE_DECIMALS);

/// Quote value of a native-asset amount at the given oracle price.
///
/// `price` is the quote price of one whole native unit, scaled by 10^8.
/// Fails with `InvalidPrice` unless strictly positive.
pub fn native_quote_value(amount: u128, price: i64) -> Result<u128, BankError> {
    if price <= 0 {
        return Err(BankError::InvalidPrice { price });
    }
    let product = amount
        .checked_mul(price as u128)
        .ok_or(BankError::Overflow)?;
    Ok(product / pow10(AssetKind::Native.decimals()))
}

/// Quote value of a stable-asset amount under the 1:1 peg.
///
/// Pure 6→8 decimal rescale; no oracle involvement.
pub fn external_quote_value(amount: u128) -> Result<u128, BankError> {
    let rescale = pow10(QUOTE_DECIMALS - AssetKind::External.decimals());
    amount.checked_mul(rescale).ok_or(BankError::Overflow)
}
