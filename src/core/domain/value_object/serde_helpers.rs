//! Serde helpers for the loosely typed inputs this crate reads.

use serde::{Deserialize, Deserializer};

/// Deserializes an explicit `null` as the type's default.
///
/// YAML writes an emptied list as `clusters:`, which is `null` rather than
/// a missing key, so `#[serde(default)]` alone is not enough.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Proxmox encodes booleans as `0`/`1`, sometimes as strings.
pub mod int_bool {
    use super::*;
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Bool(b)) => Ok(Some(b)),
            Some(Raw::Int(i)) => Ok(Some(i != 0)),
            Some(Raw::Str(s)) => match s.as_str() {
                "1" | "true" => Ok(Some(true)),
                "0" | "false" | "" => Ok(Some(false)),
                other => Err(D::Error::custom(format!("invalid boolean '{}'", other))),
            },
        }
    }
}
