// src/lib.rs

//! aptglue
//!
//! Helper toolkit used by an application-packaging system to install, pin,
//! and manage apt-level dependencies on behalf of application packages.
//!
//! # Architecture
//!
//! - Thin wrappers: every operation observes the dpkg lock, runs one external
//!   tool (`apt-get`, `dpkg`, `dpkg-query`, `equivs-build`, `gpg`), and maps
//!   its outcome to a typed result
//! - Synthetic meta-packages: per-application dependencies are declared by an
//!   empty equivs-built package so they install and purge as a group
//! - Extra repositories: a third-party source is always three artifacts
//!   (source list, pin preference, trusted key) created and removed as a unit
//! - No ambient state: callers pass an explicit [`app::AppContext`]

pub mod app;
pub mod apt;
pub mod depspec;
pub mod dpkg;
pub mod equivs;
mod error;
pub mod repository;

pub use app::{AppContext, DependencyInstaller};
pub use apt::AptRunner;
pub use depspec::{DependencySpec, PackageRef, RelOp, VersionConstraint};
pub use dpkg::lock::{wait_for_lock, LockState, LockWaiter};
pub use dpkg::{Dpkg, DpkgPaths};
pub use equivs::{EquivsBuilder, MetaPackage};
pub use error::{Error, Result};
pub use repository::{AptEtc, ExtraRepository, RepositoryManager};
