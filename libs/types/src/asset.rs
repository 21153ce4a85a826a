//! Custodial asset kinds and fixed decimal scales
//!
//! The bank custodies exactly two assets: the chain's native value-transfer
//! asset (18 decimal places) and one externally-issued stable asset
//! (6 decimal places). Both are valued in a common quote currency
//! (8 decimal places). Amounts are carried everywhere as `u128` base units;
//! `rust_decimal` is used only to render them at their scale.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places of the quote currency used for valuation
pub const QUOTE_DECIMALS: u32 = 8;

/// `10^exp` in `u128` arithmetic
pub const fn pow10(exp: u32) -> u128 {
    10u128.pow(exp)
}

/// The two asset kinds the bank custodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// The chain's base value-transfer asset
    Native,
    /// The externally-issued stable asset, pegged 1:1 to the quote currency
    External,
}

impl AssetKind {
    /// Decimal places of this asset's base unit
    pub const fn decimals(self) -> u32 {
        match self {
            AssetKind::Native => 18,
            AssetKind::External => 6,
        }
    }

    /// One whole unit of this asset in base units
    pub const fn one(self) -> u128 {
        pow10(self.decimals())
    }

    /// Render a base-unit amount at this asset's scale
    pub fn format_base_units(self, base_units: u128) -> String {
        format_with_scale(base_units, self.decimals())
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Native => write!(f, "native"),
            AssetKind::External => write!(f, "external"),
        }
    }
}

/// Render a quote-currency base-unit amount at the quote scale
pub fn format_quote_units(base_units: u128) -> String {
    format_with_scale(base_units, QUOTE_DECIMALS)
}

// Amounts beyond Decimal's 96-bit mantissa render as raw base units.
fn format_with_scale(base_units: u128, scale: u32) -> String {
    i128::try_from(base_units)
        .ok()
        .and_then(|v| Decimal::try_from_i128_with_scale(v, scale).ok())
        .map(|d| d.normalize().to_string())
        .unwrap_or_else(|| base_units.to_string())
}
