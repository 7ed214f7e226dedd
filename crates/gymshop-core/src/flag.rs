//! Serde helpers for the API's `0 | 1` integer flags.
//!
//! Fields like `selected`, `isDefault` and `isPaid` travel as integers. They
//! are modelled as `bool` in Rust; deserialization also accepts JSON booleans.

use serde::de::{self, Deserializer, Visitor};
use serde::Serializer;

/// Serializes `true` as `1` and `false` as `0`.
///
/// # Errors
///
/// Propagates the serializer's error.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

/// Accepts `0`, `1`, `true` or `false`.
///
/// # Errors
///
/// Fails on any other integer or type.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    deserializer.deserialize_any(FlagVisitor)
}

struct FlagVisitor;

impl Visitor<'_> for FlagVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("0, 1 or a boolean")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
        match v {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(E::custom(format!("flag must be 0 or 1, got {other}"))),
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
        u64::try_from(v)
            .map_err(|_| E::custom(format!("flag must be 0 or 1, got {v}")))
            .and_then(|v| self.visit_u64(v))
    }
}

/// Same encoding for `Option<bool>` patch fields.
pub mod option {
    use serde::{Deserialize, Deserializer, Serializer};

    /// # Errors
    ///
    /// Propagates the serializer's error.
    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&u8::from(*v)),
            None => serializer.serialize_none(),
        }
    }

    /// # Errors
    ///
    /// Fails on values other than `0`, `1`, booleans or null.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapped(#[serde(with = "super")] bool);

        Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(v)| v))
    }
}
