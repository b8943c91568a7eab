//! Capacity amounts. An `Amount` is always held in shannons, the smallest indivisible unit, and
//! is never negative. Units only matter when parsing and formatting. Arithmetic goes through
//! `Capacity`, the type `ckb-types` packs into cell outputs.

use ckb_types::core::{Capacity, CapacityError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shannons in one CKB.
pub const SHANNONS_PER_CKB: u64 = 100_000_000;

/// Denomination used to read or print an `Amount`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountUnit {
    /// 1 CKB = 10^8 shannons
    Ckb,
    /// The smallest indivisible unit
    Shannon,
}

impl AmountUnit {
    /// Number of decimal places the unit allows.
    pub const fn decimals(self) -> usize {
        match self {
            AmountUnit::Ckb => 8,
            AmountUnit::Shannon => 0,
        }
    }

    /// Shannons per one of this unit.
    pub const fn scale(self) -> u64 {
        match self {
            AmountUnit::Ckb => SHANNONS_PER_CKB,
            AmountUnit::Shannon => 1,
        }
    }
}

/// Errors from parsing amounts or from amount arithmetic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Empty input string
    #[error("Amount string is empty")]
    Empty,

    /// Not a non-negative decimal number
    #[error("Invalid amount string {0:?}")]
    Invalid(String),

    /// More fractional digits than the unit allows
    #[error("Amount {value:?} has more than {max} decimal places")]
    TooPrecise {
        /// The rejected input
        value: String,
        /// Decimal places allowed by the unit
        max: usize,
    },

    /// Does not fit in u64 shannons
    #[error("Amount overflows u64 shannons")]
    Overflow,

    /// Subtraction would produce a negative amount
    #[error("Amount underflow: {lhs} - {rhs} shannons")]
    Underflow {
        /// Left-hand side, in shannons
        lhs: u64,
        /// Right-hand side, in shannons
        rhs: u64,
    },
}

/// A non-negative capacity, in shannons.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Zero shannons
    pub const ZERO: Amount = Amount(0);

    /// Parse a decimal string denominated in `unit`.
    ///
    /// ```
    /// use cells_core::{Amount, AmountUnit};
    ///
    /// let a = Amount::new("61", AmountUnit::Ckb).unwrap();
    /// assert_eq!(a.shannons(), 6_100_000_000);
    /// assert_eq!(a, Amount::new("6100000000", AmountUnit::Shannon).unwrap());
    /// ```
    pub fn new(value: &str, unit: AmountUnit) -> Result<Self, AmountError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }
        let (int, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (int.is_empty() && frac.is_empty()) || !all_digits(int) || !all_digits(frac) {
            return Err(AmountError::Invalid(value.to_owned()));
        }

        let frac = frac.trim_end_matches('0');
        if frac.len() > unit.decimals() {
            return Err(AmountError::TooPrecise {
                value: value.to_owned(),
                max: unit.decimals(),
            });
        }

        // digits only, so a parse failure can only be overflow
        let int_part: u64 = match int {
            "" => 0,
            _ => int.parse().map_err(|_| AmountError::Overflow)?,
        };
        let frac_part: u64 = match frac {
            "" => 0,
            _ => format!("{:0<width$}", frac, width = unit.decimals())
                .parse()
                .map_err(|_| AmountError::Overflow)?,
        };

        int_part
            .checked_mul(unit.scale())
            .and_then(|v| v.checked_add(frac_part))
            .map(Amount)
            .ok_or(AmountError::Overflow)
    }

    /// An amount of `shannons` shannons.
    pub const fn from_shannons(shannons: u64) -> Self {
        Self(shannons)
    }

    /// An amount of `ckb` whole CKB. Saturates at `u64::MAX` shannons.
    pub const fn from_ckb(ckb: u64) -> Self {
        Self(ckb.saturating_mul(SHANNONS_PER_CKB))
    }

    /// The amount in shannons.
    pub const fn shannons(&self) -> u64 {
        self.0
    }

    /// Add, failing on overflow.
    pub fn checked_add(self, other: Amount) -> Result<Amount, AmountError> {
        Ok(Capacity::from(self).safe_add(Capacity::from(other))?.into())
    }

    /// Subtract, failing if the result would be negative.
    pub fn checked_sub(self, other: Amount) -> Result<Amount, AmountError> {
        Capacity::from(self)
            .safe_sub(Capacity::from(other))
            .map(Amount::from)
            .map_err(|_| AmountError::Underflow {
                lhs: self.0,
                rhs: other.0,
            })
    }

    /// Sum an iterator of amounts, failing on overflow.
    pub fn checked_sum<I>(amounts: I) -> Result<Amount, AmountError>
    where
        I: IntoIterator<Item = Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, a| acc.checked_add(a))
    }

    /// Format in `unit`, trimming trailing fractional zeros.
    pub fn to_string_in(&self, unit: AmountUnit) -> String {
        let int = self.0 / unit.scale();
        let frac = self.0 % unit.scale();
        if frac == 0 {
            return int.to_string();
        }
        let frac = format!("{:0width$}", frac, width = unit.decimals());
        format!("{}.{}", int, frac.trim_end_matches('0'))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} CKB", self.to_string_in(AmountUnit::Ckb))
    }
}

impl From<Capacity> for Amount {
    fn from(capacity: Capacity) -> Self {
        Self(capacity.as_u64())
    }
}

impl From<Amount> for Capacity {
    fn from(amount: Amount) -> Self {
        Capacity::shannons(amount.0)
    }
}

impl From<CapacityError> for AmountError {
    fn from(_: CapacityError) -> Self {
        AmountError::Overflow
    }
}
