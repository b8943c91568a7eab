//! Lock and type scripts. A script's code identity is its code hash together with its hash type;
//! args only select an instance.

use ckb_types::{bytes::Bytes, core::ScriptHashType, packed, prelude::*, H256};

/// Helpers on `packed::Script`
pub trait ScriptExt {
    /// True if both scripts run the same code: equal code hash and hash type. Args are ignored.
    fn same_code_type_with(&self, other: &packed::Script) -> bool;
}

impl ScriptExt for packed::Script {
    fn same_code_type_with(&self, other: &packed::Script) -> bool {
        self.code_hash() == other.code_hash() && self.hash_type() == other.hash_type()
    }
}

/// Build a script from its parts.
pub fn new_script(code_hash: &H256, hash_type: ScriptHashType, args: Bytes) -> packed::Script {
    packed::Script::new_builder()
        .code_hash(code_hash.pack())
        .hash_type(hash_type.into())
        .args(args.pack())
        .build()
}
