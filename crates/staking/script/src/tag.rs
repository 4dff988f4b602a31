use std::fmt;

/// Length of the protocol tag in bytes.
pub const TAG_BYTES_LEN: usize = 4;

/// Protocol tag prepended to the data embed payload.
///
/// Off-chain indexers match on these four bytes to associate a staking output
/// with the protocol deployment that produced it. The bytes are opaque and
/// need not be printable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagBytes([u8; TAG_BYTES_LEN]);

impl TagBytes {
    /// Creates a new `TagBytes` from a [`TAG_BYTES_LEN`]-byte array.
    pub const fn new(bytes: [u8; TAG_BYTES_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the tag as a byte array reference.
    pub const fn as_bytes(&self) -> &[u8; TAG_BYTES_LEN] {
        &self.0
    }

    /// Converts to the inner byte array.
    pub const fn into_inner(self) -> [u8; TAG_BYTES_LEN] {
        self.0
    }
}

impl From<[u8; TAG_BYTES_LEN]> for TagBytes {
    fn from(bytes: [u8; TAG_BYTES_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<TagBytes> for [u8; TAG_BYTES_LEN] {
    fn from(tag: TagBytes) -> Self {
        tag.0
    }
}

impl AsRef<[u8]> for TagBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for TagBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_hex() {
        let tag = TagBytes::new([0x62, 0x62, 0x62, 0x34]);
        assert_eq!(tag.to_string(), "62626234");
    }

    #[test]
    fn test_conversions() {
        let bytes = [0xde, 0xad, 0xbe, 0xef];
        let tag: TagBytes = bytes.into();
        let back: [u8; TAG_BYTES_LEN] = tag.into();
        assert_eq!(bytes, back);
        assert_eq!(tag.as_bytes(), &bytes);
    }
}
