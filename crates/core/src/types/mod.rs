//! Amounts and `ckb-types` extensions.

/// Capacity amounts and units
pub mod amount;

/// Cell outputs
pub mod cell;

/// Lock and type scripts
pub mod script;

/// Transactions
pub mod tx;

/// Witness args and placeholders
pub mod witness;

pub use amount::*;
pub use cell::*;
pub use script::*;
pub use tx::*;
pub use witness::*;
