// src/dpkg/query.rs

//! Installed-package queries via dpkg-query
//!
//! Every query waits for the dpkg lock first; dpkg-query reads the same
//! database the mutating tools write.

use crate::dpkg::lock::wait_for_lock;
use crate::dpkg::DpkgPaths;
use crate::error::{Error, Result};
use std::process::{Command, Stdio};

/// Marker dpkg-query prints in `${Status}` for an installed package
const INSTALLED_MARKER: &str = "ok installed";

/// Query interface over the dpkg database
#[derive(Debug, Clone, Default)]
pub struct Dpkg {
    paths: DpkgPaths,
}

impl Dpkg {
    /// Query against the live system paths
    pub fn new() -> Self {
        Self {
            paths: DpkgPaths::default(),
        }
    }

    /// Query with injected paths (tests)
    pub fn with_paths(paths: DpkgPaths) -> Self {
        Self { paths }
    }

    /// True iff `package` is currently installed
    pub fn is_installed(&self, package: &str) -> Result<bool> {
        wait_for_lock(&self.paths)?;
        let status = self.query_field(package, "${Status}")?;
        Ok(status.is_some_and(|s| status_is_installed(&s)))
    }

    /// Installed version of `package`, or the empty string if not installed
    pub fn installed_version(&self, package: &str) -> Result<String> {
        wait_for_lock(&self.paths)?;
        Ok(self.query_field(package, "${Version}")?.unwrap_or_default())
    }

    /// Declared `Depends` field of an installed package, or the empty string.
    ///
    /// Used to merge new dependencies into a meta-package that is already
    /// installed.
    pub fn installed_depends(&self, package: &str) -> Result<String> {
        wait_for_lock(&self.paths)?;
        Ok(self.query_field(package, "${Depends}")?.unwrap_or_default())
    }

    /// Run `dpkg-query -W -f=<field> <package>`.
    ///
    /// Returns `Ok(None)` when the package is unknown to dpkg (non-zero
    /// exit), which callers treat as "not installed".
    fn query_field(&self, package: &str, field: &str) -> Result<Option<String>> {
        let output = Command::new("dpkg-query")
            .arg("-W")
            .arg(format!("-f={field}"))
            .arg("--")
            .arg(package)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::ToolNotFound("dpkg-query".to_string())
                } else {
                    Error::IoError(format!("failed to run dpkg-query: {e}"))
                }
            })?;

        if !output.status.success() {
            return Ok(None);
        }

        Ok(Some(
            String::from_utf8_lossy(&output.stdout).trim().to_string(),
        ))
    }
}

/// True iff a dpkg `${Status}` string describes an installed package
fn status_is_installed(status: &str) -> bool {
    status.contains(INSTALLED_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_installed() {
        assert!(status_is_installed("install ok installed"));
        assert!(status_is_installed("hold ok installed"));
    }

    #[test]
    fn test_status_not_installed() {
        assert!(!status_is_installed("deinstall ok config-files"));
        assert!(!status_is_installed("unknown ok not-installed"));
        assert!(!status_is_installed(""));
    }
}
