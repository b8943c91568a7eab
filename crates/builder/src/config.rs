//! Chain configuration: which lock schemes exist on the active network, and the cell deps
//! needed to spend them.
//!
//! The configuration is a plain value. Builders hold it in an `Arc` and never reach for global
//! state, so the same process may build for several networks at once.

use std::io::Read;

use ckb_jsonrpc_types as json;
use ckb_types::{
    bytes::Bytes,
    core::{DepType, ScriptHashType},
    packed,
    prelude::*,
    H256,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cells_core::{new_script, ScriptExt};

/// Errors loading a chain configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed JSON, or JSON that does not describe a configuration
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// Bubbled up from the reader
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

/// Network identifiers.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ChainId {
    /// Lina, the main network
    #[serde(rename = "ckb")]
    Mainnet,
    /// Aggron, the public test network
    #[serde(rename = "ckb_testnet")]
    Testnet,
    /// A local development chain
    #[serde(rename = "ckb_dev")]
    Devnet,
}

impl ChainId {
    /// True for the main network only.
    pub fn is_mainnet(self) -> bool {
        self == ChainId::Mainnet
    }
}

/// A lock scheme's code identity and the dep that provides its code.
///
/// Serialized in the node's JSON-RPC shapes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "LockConfigJson", into = "LockConfigJson")]
pub struct LockConfig {
    /// A script with the scheme's code hash and hash type. Its args are ignored.
    pub script: packed::Script,
    /// The cell dep a transaction spending this lock must include
    pub cell_dep: packed::CellDep,
}

impl PartialEq for LockConfig {
    fn eq(&self, other: &Self) -> bool {
        self.script.as_slice() == other.script.as_slice()
            && self.cell_dep.as_slice() == other.cell_dep.as_slice()
    }
}

impl Eq for LockConfig {}

#[derive(Serialize, Deserialize)]
struct LockConfigJson {
    script: json::Script,
    cell_dep: json::CellDep,
}

impl From<LockConfigJson> for LockConfig {
    fn from(config: LockConfigJson) -> Self {
        Self::new(config.script.into(), config.cell_dep.into())
    }
}

impl From<LockConfig> for LockConfigJson {
    fn from(config: LockConfig) -> Self {
        Self {
            script: config.script.into(),
            cell_dep: config.cell_dep.into(),
        }
    }
}

impl LockConfig {
    /// Instantiate a new lock config
    pub fn new(script: packed::Script, cell_dep: packed::CellDep) -> Self {
        Self { script, cell_dep }
    }

    fn preset(code_hash: &H256, dep_tx: &H256, dep_type: DepType) -> Self {
        let cell_dep = packed::CellDep::new_builder()
            .out_point(packed::OutPoint::new(dep_tx.pack(), 0))
            .dep_type(dep_type.into())
            .build();
        Self::new(
            new_script(code_hash, ScriptHashType::Type, Bytes::new()),
            cell_dep,
        )
    }
}

// Hash constants, checked at compile time.
const fn h256(hex: &str) -> H256 {
    match hex::const_decode_to_array::<32>(hex.as_bytes()) {
        Ok(bytes) => H256(bytes),
        Err(_) => panic!("malformed H256 constant"),
    }
}

const SECP256K1_BLAKE160_CODE_HASH: H256 =
    h256("9bd7e06f3ecf4be0f2fcd2188b23f1b9fcc88e5d4b65a8637b17723bbda3cce8");

const MAINNET_SECP256K1_DEP_TX: H256 =
    h256("71a7ba8fc96349fea0ed3a5c47992e3b4084b031a42264a018e0072e8172e46c");
const MAINNET_PW_LOCK_CODE_HASH: H256 =
    h256("bf43c3602455798c1a61a596e0d95278864c552fafe231c063b3fabf97a8febc");
const MAINNET_PW_LOCK_DEP_TX: H256 =
    h256("1d60cb8f4666e039f418ea94730b1a8c5aa0bf2f7781474406387462924d15d4");

const TESTNET_SECP256K1_DEP_TX: H256 =
    h256("f8de3bb47d055cdf460d93a2a6e1b05f7432f9777c8c474abf4eec1d4aee5d37");
const TESTNET_PW_LOCK_CODE_HASH: H256 =
    h256("58c5f491aba6d61678b7cf7edf4910b1f5e00ec0cde2f42e0abb4fd9aff25a63");
const TESTNET_PW_LOCK_DEP_TX: H256 =
    h256("57a62003daeab9d54aa29b944fc3b451213a5ebdf2e232216a3cfed0dde61b38");
const TESTNET_OMNI_LOCK_CODE_HASH: H256 =
    h256("79f90bb5e892d80dd213439eeab551120eb417678824f282b4ffb5f21bad2e1e");
const TESTNET_OMNI_LOCK_DEP_TX: H256 =
    h256("9154df4f7336402114d04495175b37390ce86a4906d2d4001cf02c3e6d97f39c");

/// The lock schemes recognized on one network.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// The network this configuration describes
    pub chain_id: ChainId,
    /// The default secp256k1-blake160 lock
    pub default_lock: LockConfig,
    /// PW-lock, which bridges foreign-chain signatures
    pub pw_lock: LockConfig,
    /// Omni-lock, where deployed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omni_lock: Option<LockConfig>,
}

impl ChainConfig {
    /// Main network presets. Omni-lock is not configured.
    pub fn mainnet() -> Self {
        Self {
            chain_id: ChainId::Mainnet,
            default_lock: LockConfig::preset(
                &SECP256K1_BLAKE160_CODE_HASH,
                &MAINNET_SECP256K1_DEP_TX,
                DepType::DepGroup,
            ),
            pw_lock: LockConfig::preset(
                &MAINNET_PW_LOCK_CODE_HASH,
                &MAINNET_PW_LOCK_DEP_TX,
                DepType::Code,
            ),
            omni_lock: None,
        }
    }

    /// Public test network presets, including omni-lock.
    pub fn testnet() -> Self {
        Self {
            chain_id: ChainId::Testnet,
            default_lock: LockConfig::preset(
                &SECP256K1_BLAKE160_CODE_HASH,
                &TESTNET_SECP256K1_DEP_TX,
                DepType::DepGroup,
            ),
            pw_lock: LockConfig::preset(
                &TESTNET_PW_LOCK_CODE_HASH,
                &TESTNET_PW_LOCK_DEP_TX,
                DepType::Code,
            ),
            omni_lock: Some(LockConfig::preset(
                &TESTNET_OMNI_LOCK_CODE_HASH,
                &TESTNET_OMNI_LOCK_DEP_TX,
                DepType::Code,
            )),
        }
    }

    /// Load a configuration from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a configuration from a JSON reader, e.g. a file.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// True when configured for the main network.
    pub fn is_mainnet(&self) -> bool {
        self.chain_id.is_mainnet()
    }

    /// The configured lock whose code identity `lock` shares, in classification order.
    pub fn lock_config_for(&self, lock: &packed::Script) -> Option<&LockConfig> {
        [Some(&self.default_lock), Some(&self.pw_lock), self.omni_lock.as_ref()]
            .into_iter()
            .flatten()
            .find(|c| c.script.same_code_type_with(lock))
    }
}
