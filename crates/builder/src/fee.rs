//! Size-based fees.
//!
//! A fee rate is quoted in shannons per `FEE_BASE` (1000) bytes. Rates below `MIN_FEE_RATE`
//! are raised to it rather than rejected. The fee of a transaction is
//! `rate * size / FEE_BASE`, rounded up to the next whole shannon so the declared fee is never
//! below the minimum a node computes for the same size.

use std::str::FromStr;

use ckb_types::core::TransactionView;
use serde::{Deserialize, Serialize};

use cells_core::{Amount, TransactionExt};

/// The lowest fee rate, in shannons per 1000 bytes, a transaction is built with.
pub const MIN_FEE_RATE: u64 = 1000;

/// Number of bytes a fee rate is quoted per.
pub const FEE_BASE: u64 = 1000;

/// Capacity a change cell must hold at the least: a secp256k1 cell with no type and no data.
pub const MIN_CHANGE: Amount = Amount::from_ckb(61);

/// Shannons per `FEE_BASE` bytes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeRate(u64);

impl FeeRate {
    /// The floor rate
    pub const MIN: FeeRate = FeeRate(MIN_FEE_RATE);

    /// A rate of `rate` shannons per 1000 bytes. Not clamped; clamping happens when a fee is
    /// computed.
    pub const fn new(rate: u64) -> Self {
        Self(rate)
    }

    /// The rate as given
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// The rate raised to `MIN_FEE_RATE` if below it.
    pub fn clamped(self) -> Self {
        std::cmp::max(self, Self::MIN)
    }

    /// The fee for `size` bytes at this rate, after clamping.
    pub fn fee(&self, size: usize) -> Amount {
        let product = u128::from(self.clamped().0) * size as u128;
        let base = u128::from(FEE_BASE);
        let fee = (product + base - 1) / base;
        Amount::from_shannons(u64::try_from(fee).unwrap_or(u64::MAX))
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self::MIN
    }
}

impl From<u64> for FeeRate {
    fn from(rate: u64) -> Self {
        Self(rate)
    }
}

impl FromStr for FeeRate {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl std::fmt::Display for FeeRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} shannons/KB", self.0)
    }
}

/// The minimum fee for `tx` at `fee_rate`, in shannons.
///
/// ```
/// use cells_builder::fee::{calc_fee, FeeRate};
/// use ckb_types::core::TransactionBuilder;
///
/// let tx = TransactionBuilder::default().build();
/// assert_eq!(calc_fee(&tx, FeeRate::new(0)), calc_fee(&tx, FeeRate::MIN));
/// ```
pub fn calc_fee(tx: &TransactionView, fee_rate: FeeRate) -> Amount {
    fee_rate.fee(tx.get_size())
}

#[cfg(test)]
mod test {
    use super::*;
    use cells_core::WitnessArgsExt;
    use ckb_types::{bytes::Bytes, core::TransactionBuilder, packed, prelude::*};

    #[test]
    fn it_charges_one_shannon_per_byte_at_the_floor() {
        assert_eq!(FeeRate::new(1000).fee(500), Amount::from_shannons(500));
        assert_eq!(FeeRate::new(2000).fee(500), Amount::from_shannons(1000));
        assert_eq!(FeeRate::new(1000).fee(0), Amount::ZERO);
    }

    #[test]
    fn it_clamps_low_rates() {
        for rate in [0, 1, 500, 999] {
            for size in [0, 1, 464, 1_000_000] {
                assert_eq!(FeeRate::new(rate).fee(size), FeeRate::MIN.fee(size));
            }
        }
        assert_eq!(FeeRate::new(3).clamped(), FeeRate::MIN);
        assert_eq!(FeeRate::new(3000).clamped(), FeeRate::new(3000));
    }

    #[test]
    fn it_rounds_up_to_whole_shannons() {
        assert_eq!(FeeRate::new(1500).fee(3), Amount::from_shannons(5));
        assert_eq!(FeeRate::new(1001).fee(1), Amount::from_shannons(2));
        assert_eq!(FeeRate::new(1001).fee(1000), Amount::from_shannons(1001));
    }

    #[test]
    fn it_is_monotonic_in_rate_and_size() {
        let rates = [0, 999, 1000, 1001, 1500, 2000, 10_000];
        let sizes = [0, 1, 2, 3, 100, 464, 465, 10_000];
        for pair in rates.windows(2) {
            for size in sizes {
                assert!(FeeRate::new(pair[0]).fee(size) <= FeeRate::new(pair[1]).fee(size));
            }
        }
        for pair in sizes.windows(2) {
            for rate in rates {
                assert!(FeeRate::new(rate).fee(pair[0]) <= FeeRate::new(rate).fee(pair[1]));
            }
        }
    }

    #[test]
    fn it_saturates_instead_of_overflowing() {
        assert_eq!(
            FeeRate::new(u64::MAX).fee(usize::MAX),
            Amount::from_shannons(u64::MAX)
        );
    }

    #[test]
    fn it_prices_transactions_by_size() {
        let tx = TransactionBuilder::default()
            .witness(packed::WitnessArgs::placeholder(65).as_bytes().pack())
            .build();
        let size = tx.get_size();
        assert_eq!(calc_fee(&tx, FeeRate::MIN), Amount::from_shannons(size as u64));
        assert_eq!(calc_fee(&tx, FeeRate::new(1)), calc_fee(&tx, FeeRate::MIN));

        let with_data = tx
            .as_advanced_builder()
            .output_data(Bytes::from(vec![0u8; 100]).pack())
            .build();
        // 4-byte offset + 4-byte length + 100 bytes of data
        assert_eq!(calc_fee(&with_data, FeeRate::MIN).shannons(), size as u64 + 108);
    }

    #[test]
    fn it_parses_and_defaults() {
        assert_eq!("2000".parse::<FeeRate>().unwrap(), FeeRate::new(2000));
        assert!("-1".parse::<FeeRate>().is_err());
        assert_eq!(FeeRate::default(), FeeRate::MIN);
        assert_eq!(FeeRate::MIN.to_string(), "1000 shannons/KB");
        assert_eq!(MIN_CHANGE.shannons(), 6_100_000_000);
    }
}
