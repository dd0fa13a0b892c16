// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`WebApp`]: a discovered HTTP(S) application.

use serde::{Deserialize, Serialize};

/// A web application discovered at a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebApp {
    /// Base URL of the application.
    pub url: String,
    /// Detected technology fingerprints (e.g. `"nginx"`, `"WordPress 6.4"`).
    pub technologies: Vec<String>,
    /// Page title, if fetched.
    pub title: Option<String>,
}

impl WebApp {
    /// Construct a web app with no fingerprints or title yet.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            technologies: Vec::new(),
            title: None,
        }
    }
}
