//! Error types for the stakeledger core crate.

use std::fmt;

/// Top-level error type for stakeledger-core operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// Serialization or deserialization failed.
    Serialization(SerializationError),
    /// Coin arithmetic overflowed or underflowed.
    CoinArithmetic {
        /// Denomination the operation failed on.
        denom: String,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Serialization(e) => write!(f, "serialization error: {}", e),
            CoreError::CoinArithmetic { denom } => {
                write!(f, "coin arithmetic out of range for denom {}", denom)
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<SerializationError> for CoreError {
    fn from(e: SerializationError) -> Self {
        CoreError::Serialization(e)
    }
}

/// Errors related to serialization and deserialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to encode data to bytes.
    EncodeFailed(String),
    /// Failed to decode data from bytes.
    DecodeFailed(String),
    /// Length prefix does not match the record body.
    LengthMismatch {
        /// Length announced by the prefix.
        declared: usize,
        /// Bytes actually present after the prefix.
        actual: usize,
    },
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationError::EncodeFailed(msg) => write!(f, "encode failed: {}", msg),
            SerializationError::DecodeFailed(msg) => write!(f, "decode failed: {}", msg),
            SerializationError::LengthMismatch { declared, actual } => write!(
                f,
                "length prefix mismatch: declared {} bytes, found {}",
                declared, actual
            ),
        }
    }
}

impl std::error::Error for SerializationError {}
