use thiserror::Error;

use cells_core::{Amount, AmountError, TxError};
use ckb_types::packed;

use crate::collector::CollectorError;

/// Errors raised while assembling a transaction
#[derive(Debug, Error)]
pub enum BuilderError {
    /// The lock's code identity matches no configured lock scheme, so there is no way to know
    /// how large its witness will be.
    #[error("Unsupported lock script {0}: matches no configured lock scheme")]
    UnsupportedLockScript(packed::Script),

    /// Finalizing needs witness args, but neither were supplied nor calculated
    #[error("Witness args were neither supplied nor calculated")]
    WitnessArgsUnresolved,

    /// The collector could not supply enough capacity
    #[error("Insufficient capacity: need {needed}, collected {available}")]
    InsufficientCapacity {
        /// Capacity required
        needed: Amount,
        /// Capacity the collector supplied
        available: Amount,
    },

    /// Bubbled up from the collector
    #[error(transparent)]
    CollectorError(#[from] CollectorError),

    /// Bubbled up from amount arithmetic
    #[error(transparent)]
    AmountError(#[from] AmountError),

    /// Bubbled up from transaction validation
    #[error(transparent)]
    TxError(#[from] TxError),
}
