// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`OptionValue`]: the tagged-variant replacement for the original
//! runtime-typed adapter option map.

use serde::{Deserialize, Serialize};

/// A single adapter option value.
///
/// The workflow YAML's `options` map deserializes each value into one of
/// these variants; an adapter validates the set of keys and value shapes it
/// receives against its own allowlist before using them to build a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// A string value.
    Str(String),
    /// An integer value.
    Int(i64),
    /// A boolean flag.
    Bool(bool),
    /// A list of strings (e.g. repeated `--exclude` flags).
    List(Vec<String>),
}

impl OptionValue {
    /// Borrow as a string, if this is [`OptionValue::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Copy out as an integer, if this is [`OptionValue::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Copy out as a bool, if this is [`OptionValue::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow as a list of strings, if this is [`OptionValue::List`].
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_untagged_deserialize() {
        let s: OptionValue = serde_yaml::from_str("\"fast\"").unwrap();
        assert_eq!(s, OptionValue::Str("fast".into()));
        let i: OptionValue = serde_yaml::from_str("1000").unwrap();
        assert_eq!(i, OptionValue::Int(1000));
        let b: OptionValue = serde_yaml::from_str("true").unwrap();
        assert_eq!(b, OptionValue::Bool(true));
        let l: OptionValue = serde_yaml::from_str("[\"a\", \"b\"]").unwrap();
        assert_eq!(l, OptionValue::List(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn accessors_return_none_for_wrong_variant() {
        let v = OptionValue::Int(5);
        assert_eq!(v.as_str(), None);
        assert_eq!(v.as_int(), Some(5));
        assert_eq!(v.as_bool(), None);
    }
}
