//! Script fragments shared by the staking leaves.

use bitcoin::ScriptBuf;
use bitcoin::opcodes::all::{
    OP_CHECKSIG, OP_CHECKSIGADD, OP_CHECKSIGVERIFY, OP_CSV, OP_DROP, OP_GREATERTHANOREQUAL,
    OP_VERIFY,
};
use bitcoin::script::Builder;

use crate::types::XOnlyKeyBytes;

/// Emits `<key> OP_CHECKSIG`, or `<key> OP_CHECKSIGVERIFY` when the fragment
/// must leave nothing behind for the fragment that follows it.
pub(crate) fn single_key_fragment(key: &XOnlyKeyBytes, verify: bool) -> ScriptBuf {
    let builder = Builder::new().push_slice(key);
    if verify {
        builder.push_opcode(OP_CHECKSIGVERIFY).into_script()
    } else {
        builder.push_opcode(OP_CHECKSIG).into_script()
    }
}

/// Quorum accumulator over a key set.
///
/// Keys are normalized to ascending byte order first, so the same key set
/// always yields the same script no matter how the caller ordered it. The
/// accumulated signature count is compared against `quorum` with
/// `OP_GREATERTHANOREQUAL`; a single-key set degenerates to a plain signature
/// check.
pub(crate) fn quorum_fragment(keys: &[XOnlyKeyBytes], quorum: u32, verify: bool) -> ScriptBuf {
    debug_assert!(!keys.is_empty() && quorum as usize <= keys.len());

    if let [key] = keys {
        return single_key_fragment(key, verify);
    }

    let mut sorted: Vec<&XOnlyKeyBytes> = keys.iter().collect();
    sorted.sort_unstable();

    let mut builder = Builder::new();
    for (i, key) in sorted.into_iter().enumerate() {
        builder = builder.push_slice(key);
        builder = if i == 0 {
            builder.push_opcode(OP_CHECKSIG)
        } else {
            builder.push_opcode(OP_CHECKSIGADD)
        };
    }

    builder = builder
        .push_int(i64::from(quorum))
        .push_opcode(OP_GREATERTHANOREQUAL);
    if verify {
        builder = builder.push_opcode(OP_VERIFY);
    }
    builder.into_script()
}

/// `<key> OP_CHECKSIG <blocks> OP_CSV OP_DROP`.
///
/// The trailing drop removes the locktime value again and leaves the
/// signature check result as the single remaining stack element, keeping the
/// leaf within tapscript cleanstack rules.
pub(crate) fn timelock_fragment(key: &XOnlyKeyBytes, blocks: u16) -> ScriptBuf {
    Builder::new()
        .push_slice(key)
        .push_opcode(OP_CHECKSIG)
        .push_int(i64::from(blocks))
        .push_opcode(OP_CSV)
        .push_opcode(OP_DROP)
        .into_script()
}

/// Concatenates fragments into one leaf.
pub(crate) fn concat_fragments(fragments: &[ScriptBuf]) -> ScriptBuf {
    let mut bytes = Vec::new();
    for fragment in fragments {
        bytes.extend_from_slice(fragment.as_bytes());
    }
    ScriptBuf::from_bytes(bytes)
}
