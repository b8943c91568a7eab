//! Witness placeholders and lock classification.
//!
//! Fees are priced on size, and the largest unsized part of an unsigned transaction is the
//! signature in the first witness of each lock group. Before signing, that witness carries an
//! all-zero `lock` of exactly the length the scheme's signature structure will have. The table
//! below is the single source of those lengths; if one drifts from what the lock actually
//! signs, fees are silently mis-estimated.

use std::{fmt, sync::Arc};

use tracing::debug;

use cells_core::{ScriptExt, WitnessArgsExt};
use ckb_types::packed::{Script, WitnessArgs};

use crate::{config::ChainConfig, errors::BuilderError};

/// A recoverable secp256k1 signature: 64 bytes plus the one-byte recovery id.
pub const SECP256K1_LOCK_LEN: usize = 65;

/// PW-lock off mainnet: a secp256k1 signature plus a one-byte platform code.
pub const SECP256K1_PW_LOCK_LEN: usize = 66;

/// Omni-lock: a 20-byte `OmniLockWitnessLock` table header plus a 65-byte signature.
pub const SECP256K1_OMNI_LOCK_LEN: usize = 85;

/// A secp256r1 (WebAuthn) signature structure.
pub const SECP256R1_LOCK_LEN: usize = 300;

/// The placeholder table: one entry per signature layout.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum WitnessShape {
    /// Default lock on every network, and PW-lock on mainnet
    Secp256k1,
    /// PW-lock on test networks
    Secp256k1Pw,
    /// Omni-lock
    Secp256k1Omni,
    /// Secp256r1 locks
    Secp256r1,
}

impl WitnessShape {
    /// Every shape in the table
    pub const ALL: [WitnessShape; 4] = [
        WitnessShape::Secp256k1,
        WitnessShape::Secp256k1Pw,
        WitnessShape::Secp256k1Omni,
        WitnessShape::Secp256r1,
    ];

    /// Byte length of the placeholder `lock` field
    pub const fn lock_len(self) -> usize {
        match self {
            WitnessShape::Secp256k1 => SECP256K1_LOCK_LEN,
            WitnessShape::Secp256k1Pw => SECP256K1_PW_LOCK_LEN,
            WitnessShape::Secp256k1Omni => SECP256K1_OMNI_LOCK_LEN,
            WitnessShape::Secp256r1 => SECP256R1_LOCK_LEN,
        }
    }

    /// The zero-filled placeholder witness args
    pub fn witness_args(self) -> WitnessArgs {
        WitnessArgs::placeholder(self.lock_len())
    }
}

type Matcher = Arc<dyn Fn(&ChainConfig, &Script) -> bool + Send + Sync>;
type Resolver = Arc<dyn Fn(&ChainConfig) -> WitnessShape + Send + Sync>;

/// A recognized lock scheme: a predicate over the lock, and the shape its witness takes.
#[derive(Clone)]
pub struct LockScheme {
    name: &'static str,
    matches: Matcher,
    resolve: Resolver,
}

impl fmt::Debug for LockScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockScheme")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl LockScheme {
    /// Instantiate a new scheme
    pub fn new<M, R>(name: &'static str, matches: M, resolve: R) -> Self
    where
        M: Fn(&ChainConfig, &Script) -> bool + Send + Sync + 'static,
        R: Fn(&ChainConfig) -> WitnessShape + Send + Sync + 'static,
    {
        Self {
            name,
            matches: Arc::new(matches),
            resolve: Arc::new(resolve),
        }
    }

    /// A scheme recognized by code identity, with one shape on every network.
    pub fn with_code(name: &'static str, code: Script, shape: WitnessShape) -> Self {
        Self::new(
            name,
            move |_, lock| lock.same_code_type_with(&code),
            move |_| shape,
        )
    }

    /// The scheme's name, for logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The default secp256k1-blake160 lock.
    pub fn default_lock() -> Self {
        Self::new(
            "secp256k1",
            |config, lock| lock.same_code_type_with(&config.default_lock.script),
            |_| WitnessShape::Secp256k1,
        )
    }

    /// PW-lock. Its mainnet release signs without the platform code, so its witness is one
    /// byte shorter there.
    pub fn pw_lock() -> Self {
        Self::new(
            "pw-lock",
            |config, lock| lock.same_code_type_with(&config.pw_lock.script),
            |config| {
                if config.is_mainnet() {
                    WitnessShape::Secp256k1
                } else {
                    WitnessShape::Secp256k1Pw
                }
            },
        )
    }

    /// Omni-lock, when the configuration has one.
    pub fn omni_lock() -> Self {
        Self::new(
            "omni-lock",
            |config, lock| {
                config
                    .omni_lock
                    .as_ref()
                    .map_or(false, |omni| lock.same_code_type_with(&omni.script))
            },
            |_| WitnessShape::Secp256k1Omni,
        )
    }
}

/// Classifies lock scripts against an ordered list of schemes. The first match wins.
#[derive(Clone, Debug)]
pub struct WitnessResolver {
    schemes: Vec<LockScheme>,
}

impl Default for WitnessResolver {
    fn default() -> Self {
        Self {
            schemes: vec![
                LockScheme::default_lock(),
                LockScheme::pw_lock(),
                LockScheme::omni_lock(),
            ],
        }
    }
}

impl WitnessResolver {
    /// Append a scheme. It is consulted after every scheme already present, so existing
    /// classifications are unaffected.
    pub fn with_scheme(mut self, scheme: LockScheme) -> Self {
        self.schemes.push(scheme);
        self
    }

    /// The schemes, in priority order
    pub fn schemes(&self) -> &[LockScheme] {
        &self.schemes
    }

    /// The witness shape for `lock`.
    pub fn resolve_shape(
        &self,
        config: &ChainConfig,
        lock: &Script,
    ) -> Result<WitnessShape, BuilderError> {
        let scheme = self
            .schemes
            .iter()
            .find(|s| (s.matches)(config, lock))
            .ok_or_else(|| BuilderError::UnsupportedLockScript(lock.clone()))?;
        let shape = (scheme.resolve)(config);
        debug!(
            scheme = scheme.name,
            lock_len = shape.lock_len(),
            "classified lock script"
        );
        Ok(shape)
    }

    /// The placeholder witness args for `lock`.
    pub fn determine(
        &self,
        config: &ChainConfig,
        lock: &Script,
    ) -> Result<WitnessArgs, BuilderError> {
        Ok(self.resolve_shape(config, lock)?.witness_args())
    }
}

/// The placeholder witness args for `lock` under the built-in schemes: default lock, PW-lock,
/// then omni-lock.
pub fn determine_witness_args(
    config: &ChainConfig,
    lock: &Script,
) -> Result<WitnessArgs, BuilderError> {
    WitnessResolver::default().determine(config, lock)
}

#[cfg(test)]
mod test {
    use super::*;
    use cells_core::new_script;
    use ckb_types::{bytes::Bytes, core::ScriptHashType, prelude::*, H256};

    fn with_args(script: &Script, args: &[u8]) -> Script {
        script
            .clone()
            .as_builder()
            .args(Bytes::from(args.to_vec()).pack())
            .build()
    }

    fn unknown_lock() -> Script {
        new_script(&H256([0xee; 32]), ScriptHashType::Type, Bytes::new())
    }

    #[test]
    fn it_uses_the_secp256k1_shape_for_the_default_lock() {
        for config in [ChainConfig::mainnet(), ChainConfig::testnet()] {
            let lock = with_args(&config.default_lock.script, &[7u8; 20]);
            let w = determine_witness_args(&config, &lock).unwrap();
            let placeholder = w.lock().to_opt().unwrap().raw_data();
            assert_eq!(placeholder.len(), SECP256K1_LOCK_LEN);
            assert!(placeholder.iter().all(|b| *b == 0));
            assert!(w.input_type().to_opt().is_none());
            assert!(w.output_type().to_opt().is_none());
        }
    }

    #[test]
    fn it_adds_a_platform_byte_to_pw_lock_off_mainnet() {
        let mainnet = ChainConfig::mainnet();
        let mut testnet = ChainConfig::mainnet();
        testnet.chain_id = crate::config::ChainId::Testnet;
        let lock = with_args(&mainnet.pw_lock.script, &[1u8; 20]);

        let main = determine_witness_args(&mainnet, &lock).unwrap();
        let test = determine_witness_args(&testnet, &lock).unwrap();
        assert_eq!(main.lock_len(), SECP256K1_LOCK_LEN);
        assert_eq!(test.lock_len(), SECP256K1_PW_LOCK_LEN);
        assert_eq!(test.lock_len() - main.lock_len(), 1);

        let mut devnet = testnet.clone();
        devnet.chain_id = crate::config::ChainId::Devnet;
        assert_eq!(
            determine_witness_args(&devnet, &lock).unwrap().as_slice(),
            test.as_slice()
        );
    }

    #[test]
    fn it_recognizes_omni_lock_only_where_configured() {
        let testnet = ChainConfig::testnet();
        let omni = testnet.omni_lock.clone().unwrap().script;
        let w = determine_witness_args(&testnet, &omni).unwrap();
        assert_eq!(w.lock_len(), SECP256K1_OMNI_LOCK_LEN);

        let mainnet = ChainConfig::mainnet();
        assert!(matches!(
            determine_witness_args(&mainnet, &omni),
            Err(BuilderError::UnsupportedLockScript(_))
        ));
    }

    #[test]
    fn it_rejects_unknown_locks() {
        let unknown = unknown_lock();
        match determine_witness_args(&ChainConfig::testnet(), &unknown) {
            Err(BuilderError::UnsupportedLockScript(lock)) => {
                assert_eq!(lock.as_slice(), unknown.as_slice());
            }
            other => panic!("expected UnsupportedLockScript, got {:?}", other),
        }

        // same code hash, different hash type
        let data_typed = ChainConfig::testnet()
            .default_lock
            .script
            .as_builder()
            .hash_type(ScriptHashType::Data.into())
            .build();
        assert!(determine_witness_args(&ChainConfig::testnet(), &data_typed).is_err());
    }

    #[test]
    fn it_is_a_pure_function_of_code_identity() {
        let config = ChainConfig::testnet();
        let a = with_args(&config.pw_lock.script, &[1u8; 20]);
        let b = with_args(&config.pw_lock.script, &[2u8; 32]);
        let first = determine_witness_args(&config, &a).unwrap();
        for _ in 0..3 {
            assert_eq!(determine_witness_args(&config, &a).unwrap().as_slice(), first.as_slice());
            assert_eq!(determine_witness_args(&config, &b).unwrap().as_slice(), first.as_slice());
        }
    }

    #[test]
    fn it_matches_schemes_in_priority_order() {
        // a config where PW-lock shares the default lock's code: the default lock wins
        let mut config = ChainConfig::testnet();
        config.pw_lock.script = config.default_lock.script.clone();
        let w = determine_witness_args(&config, &config.default_lock.script).unwrap();
        assert_eq!(w.lock_len(), SECP256K1_LOCK_LEN);
    }

    #[test]
    fn it_extends_without_changing_existing_classifications() {
        let config = ChainConfig::testnet();
        let r1 = new_script(&H256([0x51; 32]), ScriptHashType::Type, Bytes::new());
        let resolver = WitnessResolver::default().with_scheme(LockScheme::with_code(
            "secp256r1",
            r1.clone(),
            WitnessShape::Secp256r1,
        ));
        assert_eq!(resolver.schemes().len(), 4);
        assert_eq!(resolver.schemes()[3].name(), "secp256r1");

        assert_eq!(
            resolver.determine(&config, &r1).unwrap().lock_len(),
            SECP256R1_LOCK_LEN
        );
        for lock in [
            config.default_lock.script.clone(),
            config.pw_lock.script.clone(),
            config.omni_lock.clone().unwrap().script,
        ] {
            assert_eq!(
                resolver.determine(&config, &lock).unwrap().as_slice(),
                determine_witness_args(&config, &lock).unwrap().as_slice()
            );
        }
    }

    #[test]
    fn it_has_distinct_placeholder_lengths() {
        let lens: Vec<usize> = WitnessShape::ALL.iter().map(|s| s.lock_len()).collect();
        assert_eq!(lens, vec![65, 66, 85, 300]);
    }
}
