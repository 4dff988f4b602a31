use std::fmt;

use serde::{Deserialize, Serialize, de};

use crate::tag::{TAG_BYTES_LEN, TagBytes};

impl Serialize for TagBytes {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.serialize_str(&self.to_string())
        } else {
            s.serialize_bytes(self.as_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for TagBytes {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        if d.is_human_readable() {
            struct HexVisitor;

            impl de::Visitor<'_> for HexVisitor {
                type Value = TagBytes;

                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "a {}-character hex string", 2 * TAG_BYTES_LEN)
                }

                fn visit_str<E: de::Error>(self, v: &str) -> Result<TagBytes, E> {
                    if !v.is_ascii() || v.len() != 2 * TAG_BYTES_LEN {
                        return Err(E::invalid_value(de::Unexpected::Str(v), &self));
                    }
                    let mut bytes = [0u8; TAG_BYTES_LEN];
                    for (i, byte) in bytes.iter_mut().enumerate() {
                        *byte = u8::from_str_radix(&v[2 * i..2 * i + 2], 16)
                            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))?;
                    }
                    Ok(TagBytes::new(bytes))
                }
            }

            d.deserialize_str(HexVisitor)
        } else {
            struct BytesVisitor;

            impl de::Visitor<'_> for BytesVisitor {
                type Value = TagBytes;

                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{TAG_BYTES_LEN} bytes")
                }

                fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<TagBytes, E> {
                    let bytes: [u8; TAG_BYTES_LEN] = v
                        .try_into()
                        .map_err(|_| E::invalid_length(v.len(), &self))?;
                    Ok(TagBytes::new(bytes))
                }
            }

            d.deserialize_bytes(BytesVisitor)
        }
    }
}
