/// Length of an x-only schnorr public key in bytes.
pub const X_ONLY_KEY_LEN: usize = 32;

/// Raw x-only key bytes as pushed into script leaves.
///
/// Curve validity is the signer's concern; leaf construction only depends on
/// the byte shape.
pub type XOnlyKeyBytes = [u8; X_ONLY_KEY_LEN];

/// Largest relative timelock encodable in the 16-bit sequence field.
pub const MAX_TIMELOCK_BLOCKS: u32 = u16::MAX as u32;
