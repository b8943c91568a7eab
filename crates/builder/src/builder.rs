//! The `builder` module defines the `Builder` contract every concrete transaction builder
//! satisfies, and `BuilderCore`, the state they share.
//!
//! A builder is constructed once per attempt. Its witness args are either supplied up front
//! (`Fixed`, e.g. a multisig layout the generic classifier can't know) or calculated from a
//! lock script before the fee is computed. Fixed args are never replaced.

use std::sync::Arc;

use async_trait::async_trait;
use ckb_types::{
    bytes::Bytes,
    core::TransactionView,
    packed::{Script, WitnessArgs},
    prelude::Entity,
};
use tracing::warn;

use cells_core::Amount;

use crate::{
    collector::Collector,
    config::ChainConfig,
    errors::BuilderError,
    fee::{calc_fee, FeeRate},
    witness::WitnessResolver,
};

/// Where a builder's witness args come from.
#[derive(Clone, Debug)]
pub enum WitnessArgsState {
    /// Not yet calculated
    Pending,
    /// Calculated from a lock script. May be recalculated.
    Computed(WitnessArgs),
    /// Supplied at construction. Never replaced.
    Fixed(WitnessArgs),
}

impl WitnessArgsState {
    /// The witness args, if resolved
    pub fn witness_args(&self) -> Option<&WitnessArgs> {
        match self {
            WitnessArgsState::Pending => None,
            WitnessArgsState::Computed(w) | WitnessArgsState::Fixed(w) => Some(w),
        }
    }

    /// True if supplied at construction
    pub fn is_fixed(&self) -> bool {
        matches!(self, WitnessArgsState::Fixed(_))
    }
}

impl PartialEq for WitnessArgsState {
    fn eq(&self, other: &Self) -> bool {
        use WitnessArgsState::*;
        match (self, other) {
            (Pending, Pending) => true,
            (Computed(a), Computed(b)) | (Fixed(a), Fixed(b)) => a.as_slice() == b.as_slice(),
            _ => false,
        }
    }
}

impl Eq for WitnessArgsState {}

/// Optional construction parameters shared by all builders.
#[derive(Clone, Debug, Default)]
pub struct BuilderOptions {
    /// Fee rate. Defaults to `MIN_FEE_RATE`.
    pub fee_rate: Option<FeeRate>,
    /// Witness args to use instead of classifying the lock. Fixes them for the builder's life.
    pub witness_args: Option<WitnessArgs>,
    /// Data for the cell the builder creates
    pub data: Option<Bytes>,
}

impl BuilderOptions {
    /// Set the fee rate
    pub fn fee_rate(mut self, fee_rate: FeeRate) -> Self {
        self.fee_rate = Some(fee_rate);
        self
    }

    /// Fix the witness args
    pub fn witness_args(mut self, witness_args: WitnessArgs) -> Self {
        self.witness_args = Some(witness_args);
        self
    }

    /// Set the output data
    pub fn data(mut self, data: Bytes) -> Self {
        self.data = Some(data);
        self
    }
}

/// State shared by every builder: configuration, collector, fee rate, witness args and the
/// last computed fee.
pub struct BuilderCore {
    config: Arc<ChainConfig>,
    collector: Arc<dyn Collector>,
    resolver: WitnessResolver,
    fee_rate: FeeRate,
    witness_args: WitnessArgsState,
    data: Option<Bytes>,
    fee: Option<Amount>,
}

impl std::fmt::Debug for BuilderCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderCore")
            .field("chain_id", &self.config.chain_id)
            .field("fee_rate", &self.fee_rate)
            .field("witness_args", &self.witness_args)
            .field("fee", &self.fee)
            .finish_non_exhaustive()
    }
}

impl BuilderCore {
    /// Instantiate builder state. Witness args in `options` are fixed for the builder's life.
    pub fn new(
        config: Arc<ChainConfig>,
        collector: Arc<dyn Collector>,
        options: BuilderOptions,
    ) -> Self {
        let witness_args = match options.witness_args {
            Some(w) => WitnessArgsState::Fixed(w),
            None => WitnessArgsState::Pending,
        };
        Self {
            config,
            collector,
            resolver: WitnessResolver::default(),
            fee_rate: options.fee_rate.unwrap_or_default(),
            witness_args,
            data: options.data,
            fee: None,
        }
    }

    /// Classify locks with `resolver` instead of the built-in schemes.
    pub fn with_resolver(mut self, resolver: WitnessResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// The chain configuration
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// The shared collector
    pub fn collector(&self) -> &dyn Collector {
        self.collector.as_ref()
    }

    /// The fee rate as supplied. Clamped when fees are computed.
    pub fn fee_rate(&self) -> FeeRate {
        self.fee_rate
    }

    /// Output data supplied in the options
    pub fn data(&self) -> Option<&Bytes> {
        self.data.as_ref()
    }

    /// The witness args state
    pub fn witness_args_state(&self) -> &WitnessArgsState {
        &self.witness_args
    }

    /// The witness args, if supplied or calculated
    pub fn witness_args(&self) -> Option<&WitnessArgs> {
        self.witness_args.witness_args()
    }

    /// True if witness args were supplied at construction
    pub fn witness_args_fixed(&self) -> bool {
        self.witness_args.is_fixed()
    }

    /// Set the witness args to the placeholder for `lock`. If witness args were supplied at
    /// construction this does nothing but log a warning.
    pub fn calculate_witness_args(&mut self, lock: &Script) -> Result<(), BuilderError> {
        if self.witness_args.is_fixed() {
            warn!("calculate_witness_args() cannot be used when witness args were supplied at construction");
            return Ok(());
        }
        let witness_args = self.resolver.determine(&self.config, lock)?;
        self.witness_args = WitnessArgsState::Computed(witness_args);
        Ok(())
    }

    /// The witness args, or `WitnessArgsUnresolved` if neither supplied nor calculated.
    pub fn resolved_witness_args(&self) -> Result<&WitnessArgs, BuilderError> {
        self.witness_args()
            .ok_or(BuilderError::WitnessArgsUnresolved)
    }

    /// The fee for `tx` at this builder's rate.
    pub fn calc_fee(&self, tx: &TransactionView) -> Amount {
        calc_fee(tx, self.fee_rate)
    }

    /// Compute the fee for `tx` and remember it as this builder's fee.
    pub fn record_fee(&mut self, tx: &TransactionView) -> Amount {
        let fee = self.calc_fee(tx);
        self.fee = Some(fee);
        fee
    }

    /// The last recorded fee. `None` until a build has computed one.
    pub fn fee(&self) -> Option<Amount> {
        self.fee
    }
}

/// A transaction builder.
///
/// Implementations assemble their own transaction shape in `build`. Before returning, `build`
/// must resolve witness args (supplied, or calculated from the spending lock) and only then
/// record a fee for the final transaction, since the witness placeholder is part of the size
/// the fee is priced on.
#[async_trait]
pub trait Builder: Send {
    /// Shared builder state
    fn core(&self) -> &BuilderCore;

    /// Mutable shared builder state
    fn core_mut(&mut self) -> &mut BuilderCore;

    /// Assemble the transaction. May suspend while the collector does I/O.
    async fn build(&mut self) -> Result<TransactionView, BuilderError>;

    /// The fee recorded by the last `build`
    fn fee(&self) -> Option<Amount> {
        self.core().fee()
    }

    /// See `BuilderCore::calculate_witness_args`
    fn calculate_witness_args(&mut self, lock: &Script) -> Result<(), BuilderError> {
        self.core_mut().calculate_witness_args(lock)
    }
}
