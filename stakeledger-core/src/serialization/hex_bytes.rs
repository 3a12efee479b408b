//! Serde adapter for fixed-size byte identifiers.
//!
//! Binary formats keep the raw fixed-width tuple, so the bincode layout is
//! the same as without the adapter. Human-readable formats (genesis JSON)
//! get a lowercase hex string.
//!
//! Use with `#[serde(with = "stakeledger_core::serialization::hex_bytes")]`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Serialize a byte array as hex or as raw bytes.
pub fn serialize<S, const N: usize>(value: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    [u8; N]: Serialize,
{
    if serializer.is_human_readable() {
        serializer.serialize_str(&hex::encode(value))
    } else {
        value.serialize(serializer)
    }
}

/// Deserialize a byte array from hex or from raw bytes.
pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
where
    D: Deserializer<'de>,
    [u8; N]: Deserialize<'de>,
{
    if deserializer.is_human_readable() {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(text.trim_start_matches("0x")).map_err(serde::de::Error::custom)?;
        let len = bytes.len();
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom(format!("expected {} bytes, got {}", N, len)))
    } else {
        <[u8; N]>::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "super")]
        id: [u8; 4],
    }

    #[test]
    fn test_binary_layout_unchanged() {
        let holder = Holder { id: [1, 2, 3, 4] };
        let bytes = crate::serialization::serialize(&holder).unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4]);

        let decoded: Holder = crate::serialization::deserialize(&bytes).unwrap();
        assert_eq!(decoded, holder);
    }
}
