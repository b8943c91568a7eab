//! The source of spendable cells. Builders pull cells from a `Collector` while building; how a
//! collector selects or indexes cells is its own business.

use async_trait::async_trait;
use ckb_types::{
    bytes::Bytes,
    packed::{CellOutput, OutPoint, Script},
    prelude::*,
};
use thiserror::Error;

use cells_core::{Amount, AmountError, CellOutputExt};

/// Errors thrown by collectors
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The backing indexer or node could not be reached
    #[error("Collector unavailable: {0}")]
    Unavailable(String),

    /// Bubbled up from amount arithmetic
    #[error(transparent)]
    AmountError(#[from] AmountError),
}

/// A live cell: where it is, what it holds, and its data.
#[derive(Clone, Debug)]
pub struct Cell {
    /// Location of the cell
    pub out_point: OutPoint,
    /// Capacity, lock and type
    pub output: CellOutput,
    /// Cell data
    pub data: Bytes,
}

impl Cell {
    /// Instantiate a new cell
    pub fn new(out_point: OutPoint, output: CellOutput, data: Bytes) -> Self {
        Self {
            out_point,
            output,
            data,
        }
    }

    /// Capacity held by the cell
    pub fn capacity(&self) -> Amount {
        self.output.capacity_amount()
    }

    /// True if the cell is locked by exactly `lock`, args included.
    pub fn is_locked_by(&self, lock: &Script) -> bool {
        self.output.lock().as_slice() == lock.as_slice()
    }

    /// True for plain capacity cells: no type script and no data.
    pub fn is_plain(&self) -> bool {
        self.output.type_().to_opt().is_none() && self.data.is_empty()
    }
}

/// A source of spendable cells. Shared between builders as `Arc<dyn Collector>`; implementations
/// do their own synchronization.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Total capacity of the plain cells locked by `lock`.
    async fn get_balance(&self, lock: &Script) -> Result<Amount, CollectorError>;

    /// Plain cells locked by `lock`, covering `needed` if the lock holds that much. Returning
    /// less than `needed` is not an error here; callers decide.
    async fn collect(&self, lock: &Script, needed: Amount) -> Result<Vec<Cell>, CollectorError>;
}

/// A collector over a fixed set of cells held in memory. Cells are returned in insertion order.
#[derive(Clone, Debug, Default)]
pub struct MemoryCollector {
    cells: Vec<Cell>,
}

impl MemoryCollector {
    /// Instantiate a collector over `cells`
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Add a cell
    pub fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    fn spendable<'a>(&'a self, lock: &'a Script) -> impl Iterator<Item = &'a Cell> + 'a {
        self.cells
            .iter()
            .filter(move |c| c.is_locked_by(lock) && c.is_plain())
    }
}

#[async_trait]
impl Collector for MemoryCollector {
    async fn get_balance(&self, lock: &Script) -> Result<Amount, CollectorError> {
        Ok(Amount::checked_sum(
            self.spendable(lock).map(Cell::capacity),
        )?)
    }

    async fn collect(&self, lock: &Script, needed: Amount) -> Result<Vec<Cell>, CollectorError> {
        let mut collected = vec![];
        let mut sum = Amount::ZERO;
        for cell in self.spendable(lock) {
            if sum >= needed {
                break;
            }
            sum = sum.checked_add(cell.capacity())?;
            collected.push(cell.clone());
        }
        Ok(collected)
    }
}
