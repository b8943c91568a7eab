//! A plain capacity transfer: one recipient output plus change back to the sender.

use std::sync::Arc;

use async_trait::async_trait;
use ckb_types::{
    bytes::Bytes,
    core::{TransactionBuilder, TransactionView},
    packed::{self, Script},
    prelude::{Entity, Pack},
};
use tracing::debug;

use cells_core::{new_output, Amount, CellOutputExt, TransactionExt};

use crate::{
    builder::{Builder, BuilderCore, BuilderOptions},
    collector::{Cell, Collector},
    config::ChainConfig,
    errors::BuilderError,
    fee::MIN_CHANGE,
};

/// Sends `amount` from the cells locked by `from` to a new cell locked by `to`. Leftover
/// capacity returns to `from` as a change cell, less the fee.
#[derive(Debug)]
pub struct SimpleBuilder {
    core: BuilderCore,
    from: Script,
    to: Script,
    amount: Amount,
}

impl SimpleBuilder {
    /// Instantiate a transfer builder. `options.data` becomes the recipient cell's data.
    pub fn new(
        config: Arc<ChainConfig>,
        collector: Arc<dyn Collector>,
        from: Script,
        to: Script,
        amount: Amount,
        options: BuilderOptions,
    ) -> Self {
        Self {
            core: BuilderCore::new(config, collector, options),
            from,
            to,
            amount,
        }
    }

    /// The sender's lock
    pub fn from(&self) -> &Script {
        &self.from
    }

    /// The recipient's lock
    pub fn to(&self) -> &Script {
        &self.to
    }

    /// The amount sent
    pub fn amount(&self) -> Amount {
        self.amount
    }

    fn assemble(
        &self,
        cell_deps: &[packed::CellDep],
        inputs: &[packed::CellInput],
        data: &Bytes,
        witness: &packed::Bytes,
        change: Amount,
    ) -> TransactionView {
        TransactionBuilder::default()
            .cell_deps(cell_deps.to_vec())
            .inputs(inputs.to_vec())
            .output(new_output(self.amount, self.to.clone(), None))
            .output(new_output(change, self.from.clone(), None))
            .output_data(data.pack())
            .output_data(packed::Bytes::default())
            .witness(witness.clone())
            .build()
    }
}

#[async_trait]
impl Builder for SimpleBuilder {
    fn core(&self) -> &BuilderCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BuilderCore {
        &mut self.core
    }

    #[tracing::instrument(skip_all, err)]
    async fn build(&mut self) -> Result<TransactionView, BuilderError> {
        if !self.core.witness_args_fixed() {
            self.core.calculate_witness_args(&self.from)?;
        }
        let witness = self.core.resolved_witness_args()?.as_bytes().pack();

        let cell_deps: Vec<_> = self
            .core
            .config()
            .lock_config_for(&self.from)
            .map(|c| c.cell_dep.clone())
            .into_iter()
            .collect();

        let data = self.core.data().cloned().unwrap_or_default();
        let change_occupied = new_output(Amount::ZERO, self.from.clone(), None).occupied_amount(0)?;
        let min_change = std::cmp::max(MIN_CHANGE, change_occupied);

        // Each pass reserves the fee the previous pass priced. Passes continue only while the
        // fee grows, and it grows only with more inputs, so this ends.
        let mut fee_reserve = Amount::ZERO;
        loop {
            let needed = self
                .amount
                .checked_add(min_change)?
                .checked_add(fee_reserve)?;
            let cells = self.core.collector().collect(&self.from, needed).await?;
            let available = Amount::checked_sum(cells.iter().map(Cell::capacity))?;
            if available < needed {
                return Err(BuilderError::InsufficientCapacity { needed, available });
            }

            let inputs: Vec<_> = cells
                .iter()
                .map(|c| packed::CellInput::new(c.out_point.clone(), 0))
                .collect();
            let change = available.checked_sub(self.amount)?;

            let tx = self.assemble(&cell_deps, &inputs, &data, &witness, change);
            let fee = self.core.record_fee(&tx);
            debug!(
                inputs = inputs.len(),
                size = tx.get_size(),
                fee = %fee,
                "priced transfer"
            );

            if change >= min_change.checked_add(fee)? {
                // the change capacity is fixed-width, so paying the fee leaves the size alone
                let tx = self.assemble(
                    &cell_deps,
                    &inputs,
                    &data,
                    &witness,
                    change.checked_sub(fee)?,
                );
                tx.validate()?;
                return Ok(tx);
            }
            fee_reserve = fee;
        }
    }
}
