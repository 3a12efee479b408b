//! Deterministic bincode configuration.
//!
//! Uses fixed-size integer encoding and little-endian byte order
//! for consistent cross-platform serialization.

use bincode::Options;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::SerializationError;

/// Configuration:
/// - Fixed-size integer encoding (not variable-length)
/// - Little-endian byte order
/// - Reject trailing bytes on deserialization
fn config() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

/// Serialize a value to bytes using deterministic configuration.
pub fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    config()
        .serialize(value)
        .map_err(|e| SerializationError::EncodeFailed(e.to_string()))
}

/// Deserialize a value from bytes.
///
/// Fails on malformed input and on trailing bytes after the value.
pub fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    config()
        .deserialize(bytes)
        .map_err(|e| SerializationError::DecodeFailed(e.to_string()))
}

/// Get the serialized size of a value without serializing it.
pub fn serialized_size<T: Serialize>(value: &T) -> Result<u64, SerializationError> {
    config()
        .serialized_size(value)
        .map_err(|e| SerializationError::EncodeFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct TestRecord {
        height: i64,
        owner: [u8; 20],
        denom: String,
    }

    #[test]
    fn test_determinism() {
        let value = TestRecord {
            height: 42,
            owner: [7u8; 20],
            denom: "stake".to_string(),
        };

        assert_eq!(serialize(&value).unwrap(), serialize(&value).unwrap());
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = serialize(&42i64).unwrap();
        bytes.push(0xFF);

        let result: Result<i64, _> = deserialize(&bytes);
        assert!(result.is_err());
    }

    #[test]
    fn test_fixed_int_encoding() {
        assert_eq!(serialize(&1i64).unwrap().len(), 8);
        assert_eq!(serialize(&i64::MAX).unwrap().len(), 8);
    }

    #[test]
    fn test_btreemap_order_is_key_order() {
        // Insertion order must not leak into the encoding.
        let mut a = BTreeMap::new();
        a.insert([2u8; 20], 1u64);
        a.insert([1u8; 20], 2u64);

        let mut b = BTreeMap::new();
        b.insert([1u8; 20], 2u64);
        b.insert([2u8; 20], 1u64);

        assert_eq!(serialize(&a).unwrap(), serialize(&b).unwrap());
    }

    #[test]
    fn test_serialized_size() {
        let value = TestRecord {
            height: 1,
            owner: [0u8; 20],
            denom: "atom".to_string(),
        };
        let size = serialized_size(&value).unwrap();
        assert_eq!(size, serialize(&value).unwrap().len() as u64);
    }
}
