// src/app/dependencies.rs

//! Top-level dependency orchestration
//!
//! Composes the lower layers: normalize the requested dependencies, build
//! and install the application's meta-package, persist the resolved
//! dependency string as an application setting, and route through the
//! repository manager when dependencies live outside the default sources.

use crate::app::AppContext;
use crate::apt::AptRunner;
use crate::depspec::DependencySpec;
use crate::dpkg::{Dpkg, DpkgPaths};
use crate::equivs::{EquivsBuilder, MetaPackage};
use crate::error::{Error, Result};
use crate::repository::{AptEtc, ExtraRepository, RepositoryManager};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Settings key under which the resolved dependency string is persisted
pub const APT_DEPENDENCIES_SETTING: &str = "apt_dependencies";

/// PHP version the default suite is expected to ship. When the installed
/// php-fpm diverges from it, the well-known third-party PHP repository has
/// been used on this host and must be registered again before dependency
/// resolution can see those packages. A narrow, named workaround, not
/// general policy.
const EXPECTED_PHP_VERSION: &str = "8.2";
const PHP_EXTRA_REPO_NAME: &str = "extra_php_version";
const PHP_EXTRA_REPO_URI: &str = "https://packages.sury.org/php/";
const PHP_EXTRA_REPO_KEY_URL: &str = "https://packages.sury.org/php/apt.gpg";
const PHP_EXTRA_REPO_PIN_PRIORITY: i32 = 600;

/// Orchestrates dependency installation for applications
#[derive(Debug, Clone)]
pub struct DependencyInstaller {
    apt: AptRunner,
    dpkg: Dpkg,
    equivs: EquivsBuilder,
    repos: RepositoryManager,
    os_release_path: PathBuf,
}

impl Default for DependencyInstaller {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyInstaller {
    /// Installer against the live system paths
    pub fn new() -> Self {
        Self::with_paths(DpkgPaths::default(), AptEtc::default())
    }

    /// Installer with injected paths (tests)
    pub fn with_paths(paths: DpkgPaths, etc: AptEtc) -> Self {
        Self {
            apt: AptRunner::with_paths(paths.clone()),
            dpkg: Dpkg::with_paths(paths.clone()),
            equivs: EquivsBuilder::with_paths(paths.clone()),
            repos: RepositoryManager::with_etc(etc, AptRunner::with_paths(paths)),
            os_release_path: PathBuf::from("/etc/os-release"),
        }
    }

    /// Install the application's apt dependencies through its meta-package
    /// and persist the resolved dependency string as an app setting
    pub fn install_dependencies(&self, ctx: &AppContext, dependencies: &str) -> Result<()> {
        let spec = DependencySpec::parse(dependencies)?;
        let meta = MetaPackage::new(ctx.meta_package_name(), ctx.manifest_version(), spec)?;

        self.ensure_php_repository()?;
        self.equivs.install(&meta)?;

        ctx.set_setting(APT_DEPENDENCIES_SETTING, &meta.depends().normalize())?;
        info!("dependencies of {} installed", ctx.id);
        Ok(())
    }

    /// Add dependencies on top of the ones already declared.
    ///
    /// Unless `replace` is set, the currently installed meta-package's
    /// `Depends` field is merged with `extra` first, so dependencies
    /// accumulate across calls.
    pub fn add_dependencies(&self, ctx: &AppContext, extra: &str, replace: bool) -> Result<()> {
        let merged = if replace {
            extra.to_string()
        } else {
            let current = self.dpkg.installed_depends(&ctx.meta_package_name())?;
            if current.is_empty() {
                extra.to_string()
            } else {
                format!("{current}, {extra}")
            }
        };

        self.install_dependencies(ctx, &merged)
    }

    /// Purge the application's meta-package together with every dependency
    /// nothing else needs
    pub fn remove_dependencies(&self, ctx: &AppContext) -> Result<()> {
        self.apt.autopurge(&[&ctx.meta_package_name()])?;
        ctx.remove_setting(APT_DEPENDENCIES_SETTING)?;
        info!("dependencies of {} removed", ctx.id);
        Ok(())
    }

    /// Install dependencies that live in an extra repository.
    ///
    /// The repository is registered only for the duration of the install
    /// and deregistered afterwards, success or failure: a temporary-source
    /// pattern, never a permanent registration.
    pub fn install_extra_dependencies(
        &self,
        ctx: &AppContext,
        repo: &ExtraRepository,
        dependencies: &str,
    ) -> Result<()> {
        self.repos.install(repo)?;

        let result = self.install_dependencies(ctx, dependencies);

        if let Err(e) = self.repos.remove(&repo.name) {
            warn!(
                "failed to deregister temporary repository '{}': {}",
                repo.name, e
            );
        }

        result
    }

    /// Register the well-known third-party PHP repository when the host
    /// already runs a PHP outside the default suite
    fn ensure_php_repository(&self) -> Result<()> {
        let installed = self.dpkg.installed_version("php-fpm")?;
        if installed.is_empty() || php_matches_expected(&installed) {
            return Ok(());
        }
        if self.repos.is_registered(PHP_EXTRA_REPO_NAME) {
            return Ok(());
        }

        warn!(
            "installed php-fpm {} differs from expected {}; registering {}",
            installed, EXPECTED_PHP_VERSION, PHP_EXTRA_REPO_URI
        );

        let suite = debian_codename(&self.os_release_path)?;
        let repo = ExtraRepository::new(PHP_EXTRA_REPO_URI, suite, "main", PHP_EXTRA_REPO_NAME)
            .with_key_url(PHP_EXTRA_REPO_KEY_URL)
            .with_pin_priority(PHP_EXTRA_REPO_PIN_PRIORITY);
        self.repos.install(&repo)
    }
}

/// True iff an installed php-fpm version string belongs to the expected
/// baseline (Debian versions prefix the upstream version, e.g.
/// `8.2.7-1~deb12u1`)
fn php_matches_expected(installed: &str) -> bool {
    match installed.strip_prefix(EXPECTED_PHP_VERSION) {
        // "8.2" must not match "8.20"
        Some(rest) => !rest.starts_with(|c: char| c.is_ascii_digit()),
        None => false,
    }
}

/// The running distribution's suite codename, from os-release
fn debian_codename(os_release_path: &Path) -> Result<String> {
    let content = fs::read_to_string(os_release_path)?;
    codename_from_os_release(&content).ok_or_else(|| {
        Error::ParseError(format!(
            "no VERSION_CODENAME in {}",
            os_release_path.display()
        ))
    })
}

fn codename_from_os_release(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        line.strip_prefix("VERSION_CODENAME=")
            .map(|value| value.trim().trim_matches('"').to_string())
            .filter(|value| !value.is_empty())
    })
}
