// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`Severity`]: a total order over vulnerability severity for threshold
//! comparisons (e.g. the CLI's exit-code policy).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a [`crate::Vulnerability`], in increasing order of urgency.
///
/// Declared least-to-most severe so the derived [`Ord`] implements the total
/// order the specification requires: `Info < Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational; not a security weakness by itself.
    Info,
    /// Low impact or low exploitability.
    Low,
    /// Moderate impact and exploitability.
    Medium,
    /// Significant impact, plausibly exploitable.
    High,
    /// Severe impact, readily exploitable.
    Critical,
}

impl Severity {
    /// All variants in ascending order, for exhaustive iteration.
    pub const ALL: [Severity; 5] = [
        Severity::Info,
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// `true` if `self` meets or exceeds `threshold`.
    pub fn meets_or_exceeds(&self, threshold: Severity) -> bool {
        *self >= threshold
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}
