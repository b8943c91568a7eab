//! # Cells Builder
//!
//! Fee-correct transaction assembly for the CKB cell model.
//!
//! A `Builder` turns a caller's intent into a `TransactionView` whose fee matches its final size.
//! Size depends on witnesses that don't exist until signing, so builders size them with
//! placeholders chosen by classifying the spending lock against the `ChainConfig`
//! (see `witness`). Fees follow `fee::calc_fee`.
//!
//! `SimpleBuilder` is a complete transfer builder over any `Collector`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// The `Builder` trait and shared builder state
pub mod builder;

/// Sources of spendable cells
pub mod collector;

/// Chain configuration
pub mod config;

/// Builder error enum
pub mod errors;

/// Fee rates and fee calculation
pub mod fee;

/// A transfer builder
pub mod simple;

/// Lock classification and witness placeholders
pub mod witness;

pub use {
    builder::{Builder, BuilderCore, BuilderOptions, WitnessArgsState},
    collector::{Cell, Collector, CollectorError, MemoryCollector},
    config::{ChainConfig, ChainId, ConfigError, LockConfig},
    errors::BuilderError,
    fee::{calc_fee, FeeRate, FEE_BASE, MIN_CHANGE, MIN_FEE_RATE},
    simple::SimpleBuilder,
    witness::{determine_witness_args, LockScheme, WitnessResolver, WitnessShape},
};
