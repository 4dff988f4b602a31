//! Virtual size estimation for taproot script path spends.
//!
//! The withdrawal transaction always has one input and one output, so the
//! only variable parts are the leaf script revealed in the witness and the
//! control block, which grows with the depth of the script tree.

use bitcoin::Script;

/// Weight of the transaction framing: version, input and output counts,
/// locktime, and the segwit marker and flag.
const TX_FRAME_WEIGHT: u64 = (4 + 1 + 1 + 4) * 4 + 2;

/// Weight of the input's non-witness fields: outpoint (36), empty script_sig
/// length (1) and sequence (4), times the witness scale factor.
const INPUT_BASE_WEIGHT: u64 = (36 + 1 + 4) * 4;

/// Witness weight that does not depend on the leaf: item count (1), a
/// length-prefixed 65-byte schnorr signature, and the length-prefixed control
/// block header (leaf version and parity byte plus the 32-byte internal key).
const WITNESS_FIXED_WEIGHT: u64 = 1 + (1 + 65) + (1 + 33);

/// Witness weight added per level of the script merkle path.
const MERKLE_NODE_WEIGHT: u64 = 32;

/// Estimates the virtual size of a one-input, one-output script path spend
/// revealing `spend_leaf`.
///
/// `leaf_count` is the total number of leaves committed in the spent output;
/// the control block carries one merkle node per tree level, so the estimate
/// grows monotonically with it.
pub(crate) fn estimate_withdrawal_vsize(
    spend_leaf: &Script,
    leaf_count: usize,
    output_script_len: usize,
) -> u64 {
    let output_weight = (8 + compact_size_len(output_script_len) + output_script_len as u64) * 4;
    let leaf_weight = compact_size_len(spend_leaf.len()) + spend_leaf.len() as u64;
    let witness_weight =
        WITNESS_FIXED_WEIGHT + leaf_weight + MERKLE_NODE_WEIGHT * merkle_depth(leaf_count);

    let total = TX_FRAME_WEIGHT + INPUT_BASE_WEIGHT + output_weight + witness_weight;
    total.div_ceil(4)
}

/// Depth of a balanced commitment over `leaf_count` leaves; a single leaf
/// needs no merkle path.
fn merkle_depth(leaf_count: usize) -> u64 {
    match leaf_count {
        0 | 1 => 0,
        n => u64::from(usize::BITS - (n - 1).leading_zeros()),
    }
}

fn compact_size_len(n: usize) -> u64 {
    match n {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::ScriptBuf;

    use super::*;

    fn leaf() -> ScriptBuf {
        // shape does not matter here, only the length
        ScriptBuf::from_bytes(vec![0x51; 40])
    }

    #[test]
    fn test_estimate_grows_with_leaf_count() {
        let leaf = leaf();
        let sizes: Vec<u64> = [1, 2, 3, 5, 8]
            .iter()
            .map(|count| estimate_withdrawal_vsize(&leaf, *count, 34))
            .collect();

        for pair in sizes.windows(2) {
            assert!(pair[0] <= pair[1], "estimate must not shrink: {sizes:?}");
        }
        assert!(sizes[0] < sizes[4]);
    }

    #[test]
    fn test_estimate_in_plausible_range() {
        // a taproot script path spend of this shape is roughly 120-200 vbytes
        let vsize = estimate_withdrawal_vsize(&leaf(), 2, 34);
        assert!((100..250).contains(&vsize), "vsize {vsize}");
    }

    #[test]
    fn test_merkle_depth() {
        assert_eq!(merkle_depth(1), 0);
        assert_eq!(merkle_depth(2), 1);
        assert_eq!(merkle_depth(3), 2);
        assert_eq!(merkle_depth(4), 2);
        assert_eq!(merkle_depth(5), 3);
    }

    #[test]
    fn test_compact_size_boundaries() {
        assert_eq!(compact_size_len(0xfc), 1);
        assert_eq!(compact_size_len(0xfd), 3);
        assert_eq!(compact_size_len(0xffff), 3);
        assert_eq!(compact_size_len(0x10000), 5);
    }
}
