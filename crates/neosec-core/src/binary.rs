// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`BinaryResolution`]: the result of resolving one adapter-required binary
//! name to a usable path, per `4.1`'s `validate_dependencies` hook.

use serde::{Deserialize, Serialize};

/// Where a binary name should be looked for.
///
/// Resolves the open question in `9. DESIGN NOTES`: an explicit configured
/// path always wins over a `PATH` lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinarySource {
    /// An explicit path configured for this binary.
    Explicit(String),
    /// Resolved by searching `PATH`.
    Path,
}

/// Outcome of resolving one required binary name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryResolution {
    /// The binary name that was requested (e.g. `"nmap"`).
    pub binary: String,
    /// Whether a usable executable was found.
    pub available: bool,
    /// Absolute path it resolved to, if found.
    pub resolved_path: Option<String>,
    /// Where the resolution came from.
    pub source: BinarySource,
}

impl BinaryResolution {
    /// Resolve `binary`, preferring `explicit_path` (if given, and if it
    /// exists and is executable) over a `PATH` search.
    pub fn resolve(binary: &str, explicit_path: Option<&str>, path_env: Option<&str>) -> Self {
        if let Some(path) = explicit_path {
            let available = std::path::Path::new(path).is_file();
            return Self {
                binary: binary.to_string(),
                available,
                resolved_path: available.then(|| path.to_string()),
                source: BinarySource::Explicit(path.to_string()),
            };
        }

        let found = path_env.and_then(|paths| {
            std::env::split_paths(paths)
                .map(|dir| dir.join(binary))
                .find(|candidate| candidate.is_file())
        });

        Self {
            binary: binary.to_string(),
            available: found.is_some(),
            resolved_path: found.map(|p| p.to_string_lossy().into_owned()),
            source: BinarySource::Path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_path_wins_even_if_path_env_also_has_it() {
        let dir = tempfile_dir();
        let bin_path = dir.join("mytool");
        std::fs::File::create(&bin_path).unwrap().write_all(b"#!/bin/sh\n").unwrap();

        let res = BinaryResolution::resolve(
            "mytool",
            Some(bin_path.to_str().unwrap()),
            Some(dir.to_str().unwrap()),
        );
        assert!(res.available);
        assert_eq!(res.source, BinarySource::Explicit(bin_path.to_string_lossy().into_owned()));
    }

    #[test]
    fn explicit_missing_path_is_unavailable_regardless_of_path_env() {
        let res = BinaryResolution::resolve("mytool", Some("/nonexistent/mytool"), Some("/bin"));
        assert!(!res.available);
    }

    #[test]
    fn falls_back_to_path_search_when_no_explicit_path() {
        let dir = tempfile_dir();
        let bin_path = dir.join("mytool");
        std::fs::File::create(&bin_path).unwrap();

        let res = BinaryResolution::resolve("mytool", None, Some(dir.to_str().unwrap()));
        assert!(res.available);
        assert_eq!(res.source, BinarySource::Path);
    }

    #[test]
    fn reports_unavailable_when_not_found_anywhere() {
        let res = BinaryResolution::resolve("ghost-tool-xyz", None, Some("/bin"));
        assert!(!res.available);
    }

    fn tempfile_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "neosec-core-test-{}-{:?}",
            std::process::id(),
            std::time::Instant::now()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
