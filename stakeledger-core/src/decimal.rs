//! Fixed-precision decimal helpers.
//!
//! All balances and ratios are [`Decimal`] values from `rust_decimal`:
//! a 96-bit mantissa with a base-10 scale, computed entirely in software
//! so that every replica derives the same result bit for bit.
//!
//! `Decimal`'s own serde support writes a string, which is not a stable
//! binary layout. Records in this workspace use [`canonical`] instead,
//! which writes the 16-byte internal representation.

use rust_decimal::prelude::ToPrimitive;

pub use rust_decimal::Decimal;

/// Convert an integer coin amount into a decimal.
#[inline]
pub fn from_amount(amount: u64) -> Decimal {
    Decimal::from(amount)
}

/// Truncate a non-negative decimal to an integer coin amount.
///
/// Returns `None` for negative values or values that do not fit in a u64.
pub fn floor_amount(value: Decimal) -> Option<u64> {
    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }
    value.floor().to_u64()
}

/// Serde adapter writing a [`Decimal`] as its 16-byte canonical form.
///
/// Human-readable formats (genesis JSON) get the decimal string instead.
/// Use with `#[serde(with = "stakeledger_core::decimal::canonical")]`.
pub mod canonical {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{Deserializer, Serializer};

    /// Serialize as 16 raw bytes, or as a string for human-readable formats.
    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(value)
        } else {
            serializer.serialize_bytes(&value.serialize())
        }
    }

    /// Deserialize from 16 raw bytes, a decimal string, or an integer.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        struct DecimalVisitor;

        impl<'de> serde::de::Visitor<'de> for DecimalVisitor {
            type Value = Decimal;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("16 bytes or a decimal string")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Decimal, E> {
                Decimal::from_str(v).map_err(E::custom)
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Decimal, E> {
                Ok(Decimal::from(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Decimal, E> {
                Ok(Decimal::from(v))
            }

            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Decimal, E> {
                let bytes: [u8; 16] = v
                    .try_into()
                    .map_err(|_| E::invalid_length(v.len(), &self))?;
                Ok(Decimal::deserialize(bytes))
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<Decimal, A::Error> {
                let mut bytes = [0u8; 16];
                for (i, byte) in bytes.iter_mut().enumerate() {
                    *byte = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                }
                Ok(Decimal::deserialize(bytes))
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_any(DecimalVisitor)
        } else {
            deserializer.deserialize_bytes(DecimalVisitor)
        }
    }
}
