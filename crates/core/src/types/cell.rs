use ckb_types::{core::Capacity, packed, prelude::*};

use crate::types::{Amount, AmountError};

/// Capacity views of `packed::CellOutput`
pub trait CellOutputExt {
    /// Capacity held by the cell
    fn capacity_amount(&self) -> Amount;

    /// The least capacity this cell may hold when carrying `data_len` bytes of data.
    fn occupied_amount(&self, data_len: usize) -> Result<Amount, AmountError>;
}

impl CellOutputExt for packed::CellOutput {
    fn capacity_amount(&self) -> Amount {
        let capacity: Capacity = self.capacity().unpack();
        capacity.into()
    }

    fn occupied_amount(&self, data_len: usize) -> Result<Amount, AmountError> {
        Ok(self.occupied_capacity(Capacity::bytes(data_len)?)?.into())
    }
}

/// Build an output holding `capacity`.
pub fn new_output(
    capacity: Amount,
    lock: packed::Script,
    type_: Option<packed::Script>,
) -> packed::CellOutput {
    packed::CellOutput::new_builder()
        .capacity(Capacity::from(capacity).pack())
        .lock(lock)
        .type_(type_.pack())
        .build()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::new_script;
    use ckb_types::{bytes::Bytes, core::ScriptHashType, H256};

    fn lock() -> packed::Script {
        new_script(&H256([9u8; 32]), ScriptHashType::Type, Bytes::from(vec![1u8; 20]))
    }

    #[test]
    fn it_reads_capacity_back() {
        let output = new_output(Amount::from_shannons(6_100_000_123), lock(), None);
        assert_eq!(output.capacity_amount(), Amount::from_shannons(6_100_000_123));
    }

    #[test]
    fn it_counts_occupied_capacity() {
        let plain = new_output(Amount::ZERO, lock(), None);
        assert_eq!(plain.occupied_amount(0).unwrap(), Amount::from_ckb(61));
        assert_eq!(plain.occupied_amount(16).unwrap(), Amount::from_ckb(77));

        let typed = new_output(Amount::ZERO, lock(), Some(lock()));
        assert_eq!(typed.occupied_amount(0).unwrap(), Amount::from_ckb(114));
    }
}
