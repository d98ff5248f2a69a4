// src/dpkg/mod.rs

//! dpkg database access: lock observation and installed-package queries

pub mod lock;
mod query;

pub use query::Dpkg;

use std::path::{Path, PathBuf};

/// Filesystem locations of the dpkg lock files and staging directory.
///
/// The defaults point at the live system paths; tests inject a set rooted
/// in a temporary directory via [`DpkgPaths::under`].
#[derive(Debug, Clone)]
pub struct DpkgPaths {
    /// Lock files apt/dpkg hold while mutating the package database
    pub lock_files: Vec<PathBuf>,
    /// Staging directory dpkg uses for pending database updates
    pub updates_dir: PathBuf,
}

impl Default for DpkgPaths {
    fn default() -> Self {
        Self {
            lock_files: vec![
                PathBuf::from("/var/lib/dpkg/lock-frontend"),
                PathBuf::from("/var/lib/dpkg/lock"),
                PathBuf::from("/var/cache/apt/archives/lock"),
            ],
            updates_dir: PathBuf::from("/var/lib/dpkg/updates"),
        }
    }
}

impl DpkgPaths {
    /// Build a path set rooted under `root` instead of `/`
    pub fn under(root: &Path) -> Self {
        Self {
            lock_files: vec![
                root.join("var/lib/dpkg/lock-frontend"),
                root.join("var/lib/dpkg/lock"),
                root.join("var/cache/apt/archives/lock"),
            ],
            updates_dir: root.join("var/lib/dpkg/updates"),
        }
    }
}
