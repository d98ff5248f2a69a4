// src/repository/mod.rs

//! Extra-repository management
//!
//! An extra repository is a third-party package source added beyond the
//! system defaults, temporarily or permanently. Registering one always
//! produces three artifacts keyed by the repository name (source list, pin
//! preference, trusted key), and deregistering removes all three; they are
//! never created or destroyed separately.

mod keys;
pub mod sources;

pub use sources::{AptEtc, DEFAULT_PIN_PRIORITY};

use crate::apt::AptRunner;
use crate::error::Result;
use tracing::info;

/// An extra package source: uri + suite + component, plus the optional
/// signing key and pin priority
#[derive(Debug, Clone)]
pub struct ExtraRepository {
    pub uri: String,
    pub suite: String,
    pub component: String,
    /// Display name; keys the three on-disk artifacts
    pub name: String,
    pub key_url: Option<String>,
    pub pin_priority: Option<i32>,
    /// Append to an existing source list instead of overwriting it
    pub append: bool,
}

impl ExtraRepository {
    pub fn new(
        uri: impl Into<String>,
        suite: impl Into<String>,
        component: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            suite: suite.into(),
            component: component.into(),
            name: name.into(),
            key_url: None,
            pin_priority: None,
            append: false,
        }
    }

    pub fn with_key_url(mut self, key_url: impl Into<String>) -> Self {
        self.key_url = Some(key_url.into());
        self
    }

    pub fn with_pin_priority(mut self, priority: i32) -> Self {
        self.pin_priority = Some(priority);
        self
    }

    pub fn appending(mut self) -> Self {
        self.append = true;
        self
    }
}

/// Manages extra repositories as three-artifact units
#[derive(Debug, Clone, Default)]
pub struct RepositoryManager {
    etc: AptEtc,
    apt: AptRunner,
}

impl RepositoryManager {
    /// Manager against the live `/etc/apt` layout
    pub fn new() -> Self {
        Self {
            etc: AptEtc::default(),
            apt: AptRunner::new(),
        }
    }

    /// Manager with an injected layout and runner (tests)
    pub fn with_etc(etc: AptEtc, apt: AptRunner) -> Self {
        Self { etc, apt }
    }

    pub fn etc(&self) -> &AptEtc {
        &self.etc
    }

    /// Whether a repository of this name is currently registered
    pub fn is_registered(&self, name: &str) -> bool {
        self.etc.source_path(name).exists()
    }

    /// Register an extra repository: source list, pin, key, then a final
    /// index refresh so the new source is immediately queryable
    pub fn install(&self, repo: &ExtraRepository) -> Result<()> {
        info!("registering extra repository '{}' ({})", repo.name, repo.uri);

        sources::write_source(&self.etc, repo)?;

        let origin = sources::pin_origin(&repo.uri)?;
        sources::write_pin(
            &self.etc,
            &repo.name,
            "*",
            &format!("origin {origin}"),
            repo.pin_priority.unwrap_or(DEFAULT_PIN_PRIORITY),
            false,
        )?;

        if let Some(key_url) = &repo.key_url {
            keys::install_key(&self.etc, &repo.name, key_url)?;
        }

        self.apt.update()
    }

    /// Deregister a repository, removing all trace of it, then refresh the
    /// index
    pub fn remove(&self, name: &str) -> Result<()> {
        info!("deregistering extra repository '{}'", name);
        sources::remove_artifacts(&self.etc, name)?;
        self.apt.update()
    }

    /// Write a standalone pin preference without registering a source.
    ///
    /// Used for priority rules that steer apt toward or away from an
    /// origin, e.g. an upgrade-exclusion pin at 995.
    pub fn pin(
        &self,
        name: &str,
        package: &str,
        pin: &str,
        priority: i32,
        append: bool,
    ) -> Result<()> {
        sources::write_pin(&self.etc, name, package, pin, priority, append)
    }
}
