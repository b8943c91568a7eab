//! Fee-relevant size and a structural validity check for `TransactionView`.

use ckb_types::{core::TransactionView, packed, prelude::*};
use thiserror::Error;

use crate::types::{Amount, AmountError, CellOutputExt};

/// Bytes a transaction occupies in a block beyond its own serialization: its offset in the
/// block's transaction list.
pub const TX_OFFSET_SIZE: usize = 4;

/// Structural problems found by `TransactionExt::validate`.
#[derive(Debug, Error)]
pub enum TxError {
    /// A transaction must spend at least one cell
    #[error("Transaction has no inputs")]
    NoInputs,

    /// A transaction must create at least one cell
    #[error("Transaction has no outputs")]
    NoOutputs,

    /// Every output needs exactly one data entry
    #[error("Transaction has {outputs} outputs but {data} outputs data entries")]
    OutputsDataMismatch {
        /// Number of outputs
        outputs: usize,
        /// Number of data entries
        data: usize,
    },

    /// Witnesses are positional on inputs
    #[error("Transaction has {witnesses} witnesses for {inputs} inputs")]
    TooManyWitnesses {
        /// Number of witnesses
        witnesses: usize,
        /// Number of inputs
        inputs: usize,
    },

    /// An output holds less capacity than it occupies
    #[error("Output {index} holds {capacity} but occupies {occupied}")]
    InsufficientCellCapacity {
        /// Output index
        index: usize,
        /// Capacity held
        capacity: Amount,
        /// Capacity required
        occupied: Amount,
    },

    /// Occupied capacity overflowed
    #[error(transparent)]
    AmountError(#[from] AmountError),
}

/// Builder-facing helpers on `TransactionView`.
///
/// Witnesses are positional: witness `i` belongs to input `i`. Inputs past the last witness
/// share the lock group of an earlier input and carry no witness of their own.
pub trait TransactionExt {
    /// Size of the transaction as counted for fees: its serialization plus its offset in the
    /// block.
    fn get_size(&self) -> usize;

    /// Check the transaction is structurally sound. This is not consensus validation: scripts
    /// are not run and inputs are not resolved.
    fn validate(&self) -> Result<(), TxError>;

    /// The witness at `index` parsed as witness args, if present and well-formed.
    fn witness_args(&self, index: usize) -> Option<packed::WitnessArgs>;
}

impl TransactionExt for TransactionView {
    fn get_size(&self) -> usize {
        self.data().total_size() + TX_OFFSET_SIZE
    }

    fn validate(&self) -> Result<(), TxError> {
        let inputs = self.inputs().len();
        let outputs = self.outputs().len();
        let data = self.outputs_data().len();
        let witnesses = self.witnesses().len();

        if inputs == 0 {
            return Err(TxError::NoInputs);
        }
        if outputs == 0 {
            return Err(TxError::NoOutputs);
        }
        if outputs != data {
            return Err(TxError::OutputsDataMismatch { outputs, data });
        }
        if witnesses > inputs {
            return Err(TxError::TooManyWitnesses { witnesses, inputs });
        }
        for (index, (output, data)) in self
            .outputs()
            .into_iter()
            .zip(self.outputs_data().into_iter())
            .enumerate()
        {
            let occupied = output.occupied_amount(data.raw_data().len())?;
            let capacity = output.capacity_amount();
            if capacity < occupied {
                return Err(TxError::InsufficientCellCapacity {
                    index,
                    capacity,
                    occupied,
                });
            }
        }
        Ok(())
    }

    fn witness_args(&self, index: usize) -> Option<packed::WitnessArgs> {
        let witness = self.witnesses().get(index)?;
        packed::WitnessArgs::from_slice(&witness.raw_data()).ok()
    }
}
