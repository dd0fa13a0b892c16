// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`Cvss`]: an optional Common Vulnerability Scoring System rating attached
//! to a [`crate::Vulnerability`].

use serde::{Deserialize, Serialize};

/// CVSS version a [`Cvss`] vector was computed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CvssVersion {
    /// CVSS v3.0.
    V3_0,
    /// CVSS v3.1.
    V3_1,
    /// CVSS v4.0.
    V4_0,
}

/// A Common Vulnerability Scoring System rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cvss {
    /// The CVSS vector string (e.g. `"CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H"`).
    pub vector: String,
    /// Base score, constrained to `[0.0, 10.0]` by [`Cvss::new`].
    pub base_score: f64,
    /// CVSS version the score was computed under.
    pub version: CvssVersion,
}

impl Cvss {
    /// Construct a `Cvss`, clamping `base_score` into `[0.0, 10.0]`.
    pub fn new(vector: impl Into<String>, base_score: f64, version: CvssVersion) -> Self {
        Self {
            vector: vector.into(),
            base_score: base_score.clamp(0.0, 10.0),
            version,
        }
    }
}
