// SPDX-License-Identifier: MIT OR Apache-2.0
//! Serde helpers for representing [`Duration`] as a plain integer number of
//! seconds in workflow YAML, matching the external interface's
//! `timeout: <seconds>` convention.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

/// (De)serialize a `Duration` as whole seconds.
pub fn serialize<S: Serializer>(val: &Duration, ser: S) -> Result<S::Ok, S::Error> {
    val.as_secs().serialize(ser)
}

/// Deserialize a `Duration` from whole seconds.
pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
    let secs = u64::deserialize(de)?;
    Ok(Duration::from_secs(secs))
}

/// Same encoding for `Option<Duration>`.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(val: &Option<Duration>, ser: S) -> Result<S::Ok, S::Error> {
        match val {
            Some(d) => d.as_secs().serialize(ser),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Duration>, D::Error> {
        let opt: Option<u64> = Option::deserialize(de)?;
        Ok(opt.map(Duration::from_secs))
    }
}
