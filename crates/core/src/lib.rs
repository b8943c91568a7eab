//! # Cells Core
//!
//! `cells-core` adapts `ckb-types` for `cells-builder`. Wire encoding, hashing and occupied
//! capacity all come from `ckb-types`; this crate adds what a fee-aware builder needs on top.
//!
//! ## Crate Layout
//!
//! ### Amount
//!
//! `Amount` is a shannon count that parses and prints in CKB or shannons, with checked
//! arithmetic backed by `Capacity`.
//!
//! ### Extension traits
//!
//! - `ScriptExt`: code identity comparison, used to classify locks.
//! - `CellOutputExt`: capacity and occupied capacity as `Amount`s.
//! - `WitnessArgsExt`: zero-filled placeholders sized to a lock's signature.
//! - `TransactionExt`: fee-relevant size and structural validation of a `TransactionView`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod types;

pub use types::*;
