//! Length-prefixed record framing.
//!
//! Every record written to the store is `len (u32 LE) || body`, where
//! `body` is the deterministic bincode encoding of the record.

use serde::{de::DeserializeOwned, Serialize};

use super::bincode_config::{deserialize, serialize, serialized_size};
use crate::error::SerializationError;

/// Number of bytes in the length prefix.
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// Encode a record with its length prefix.
pub fn encode_record<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let size = serialized_size(value)?;
    let len = u32::try_from(size).map_err(|_| {
        SerializationError::EncodeFailed(format!("record of {} bytes exceeds u32", size))
    })?;

    let mut out = Vec::with_capacity(LENGTH_PREFIX_BYTES + len as usize);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&serialize(value)?);
    Ok(out)
}

/// Decode a length-prefixed record.
///
/// The prefix must match the number of body bytes exactly.
pub fn decode_record<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    if bytes.len() < LENGTH_PREFIX_BYTES {
        return Err(SerializationError::DecodeFailed(format!(
            "record of {} bytes is shorter than its length prefix",
            bytes.len()
        )));
    }

    let (prefix, body) = bytes.split_at(LENGTH_PREFIX_BYTES);
    let mut len_bytes = [0u8; LENGTH_PREFIX_BYTES];
    len_bytes.copy_from_slice(prefix);
    let declared = u32::from_le_bytes(len_bytes) as usize;

    if declared != body.len() {
        return Err(SerializationError::LengthMismatch {
            declared,
            actual: body.len(),
        });
    }

    deserialize(body)
}
