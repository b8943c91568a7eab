//! Witness args placeholders.
//!
//! Before signing, the first witness of a lock group holds an all-zero `lock` of the exact
//! length the signature structure will have, so that size-based fee estimation sees the final
//! size.

use ckb_types::{bytes::Bytes, packed, prelude::*};

/// Placeholder helpers on `packed::WitnessArgs`
pub trait WitnessArgsExt {
    /// Witness args whose `lock` is `lock_len` zero bytes, other fields absent.
    fn placeholder(lock_len: usize) -> Self;

    /// Length of the `lock` field, 0 if absent.
    fn lock_len(&self) -> usize;
}

impl WitnessArgsExt for packed::WitnessArgs {
    fn placeholder(lock_len: usize) -> Self {
        packed::WitnessArgs::new_builder()
            .lock(Some(Bytes::from(vec![0u8; lock_len])).pack())
            .build()
    }

    fn lock_len(&self) -> usize {
        self.lock().to_opt().map_or(0, |lock| lock.raw_data().len())
    }
}
