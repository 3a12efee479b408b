//! Deterministic binary serialization for stakeledger records.
//!
//! All persisted records are serialized using bincode with a deterministic
//! configuration and wrapped in a length prefix. This ensures:
//! - Same input always produces same output on every replica
//! - Cross-platform consistency
//! - Truncated or padded store values are detected on read

mod bincode_config;
pub mod hex_bytes;
mod record;

pub use bincode_config::{deserialize, serialize, serialized_size};
pub use record::{decode_record, encode_record, LENGTH_PREFIX_BYTES};
