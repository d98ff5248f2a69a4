// src/equivs/mod.rs

//! Synthetic dependency meta-packages
//!
//! A meta-package is an empty installable unit whose only purpose is
//! declaring an application's apt dependencies, so they can be installed
//! and purged as a group. The descriptor is rendered to an equivs control
//! file in a transient directory, built with `equivs-build`, force-installed
//! with its own dependency requirements ignored, and then repaired with
//! `apt-get install --fix-broken` so only the *declared* dependencies need
//! resolving.
//!
//! On repair failure the apt log is parsed for the unresolvable names, a
//! simulated install of just those names is emitted to stderr to surface
//! the underlying reasons, and the operation fails fatally; it is not
//! retried. The transient build directory is removed on every exit path.

pub mod diagnostics;

use crate::apt::AptRunner;
use crate::depspec::DependencySpec;
use crate::dpkg::lock::wait_for_lock;
use crate::dpkg::{Dpkg, DpkgPaths};
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

/// Bound on the external builder tool; an empty package builds in seconds
const EQUIVS_BUILD_TIMEOUT: Duration = Duration::from_secs(300);

/// Descriptor for a synthetic dependency package
#[derive(Debug, Clone)]
pub struct MetaPackage {
    name: String,
    version: String,
    depends: DependencySpec,
}

impl MetaPackage {
    /// Create a descriptor, rejecting empty name or version before any
    /// build or install is attempted
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        depends: DependencySpec,
    ) -> Result<Self> {
        let name = name.into();
        let version = version.into();

        if name.trim().is_empty() {
            return Err(Error::InvalidDescriptor("package name is empty".to_string()));
        }
        if version.trim().is_empty() {
            return Err(Error::InvalidDescriptor(format!(
                "package '{name}' has an empty version"
            )));
        }

        Ok(Self {
            name,
            version,
            depends,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The normalized dependency expression this package declares
    pub fn depends(&self) -> &DependencySpec {
        &self.depends
    }

    /// Render the equivs control descriptor
    pub fn render_control(&self) -> String {
        format!(
            "Section: misc\n\
             Priority: optional\n\
             Package: {name}\n\
             Version: {version}\n\
             Depends: {depends}\n\
             Architecture: all\n\
             Description: Dependency meta-package\n\
             \x20This empty package declares the system dependencies of an\n\
             \x20application so they install and purge as a group.\n",
            name = self.name,
            version = self.version,
            depends = self.depends,
        )
    }

    /// File name equivs-build gives the produced unit
    fn deb_file_name(&self) -> String {
        format!("{}_{}_all.deb", self.name, self.version)
    }
}

/// Builds and installs synthetic dependency packages
#[derive(Debug, Clone, Default)]
pub struct EquivsBuilder {
    paths: DpkgPaths,
    apt: AptRunner,
    dpkg: Dpkg,
}

impl EquivsBuilder {
    /// Builder against the live system paths
    pub fn new() -> Self {
        Self::with_paths(DpkgPaths::default())
    }

    /// Builder with injected dpkg paths (tests)
    pub fn with_paths(paths: DpkgPaths) -> Self {
        Self {
            apt: AptRunner::with_paths(paths.clone()),
            dpkg: Dpkg::with_paths(paths.clone()),
            paths,
        }
    }

    /// Build and install a meta-package, resolving its declared
    /// dependencies.
    ///
    /// Success is signalled by the meta-package reporting installed
    /// afterwards; anything less is an error.
    pub fn install(&self, meta: &MetaPackage) -> Result<()> {
        info!(
            "installing dependency meta-package {} {}",
            meta.name(),
            meta.version()
        );

        self.apt.update()?;

        // Dropped on every exit path below, success or failure
        let build_dir = TempDir::new()?;

        let control_path = build_dir.path().join(format!("{}.control", meta.name()));
        fs::write(&control_path, meta.render_control())?;

        self.run_equivs_build(build_dir.path(), &control_path)?;

        let deb_path = build_dir.path().join(meta.deb_file_name());
        if !deb_path.exists() {
            return Err(Error::BuildFailed(format!(
                "equivs-build produced no {}",
                meta.deb_file_name()
            )));
        }

        self.force_install(&deb_path)?;
        self.repair_dependencies(meta)
    }

    /// Run the external builder in the transient directory
    fn run_equivs_build(&self, dir: &Path, control: &Path) -> Result<()> {
        debug!("building meta-package from {}", control.display());

        let mut child = Command::new("equivs-build")
            .arg(control)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::ToolNotFound("equivs-build".to_string())
                } else {
                    Error::IoError(format!("failed to run equivs-build: {e}"))
                }
            })?;

        match child.wait_timeout(EQUIVS_BUILD_TIMEOUT)? {
            Some(status) => {
                let output = child.wait_with_output()?;
                for line in String::from_utf8_lossy(&output.stdout).lines() {
                    debug!("[equivs-build] {}", line);
                }
                for line in String::from_utf8_lossy(&output.stderr).lines() {
                    warn!("[equivs-build] {}", line);
                }

                if status.success() {
                    Ok(())
                } else {
                    Err(Error::BuildFailed(format!(
                        "equivs-build exited with code {}",
                        status.code().unwrap_or(-1)
                    )))
                }
            }
            None => {
                let _ = child.kill();
                Err(Error::BuildFailed(format!(
                    "equivs-build timed out after {} seconds",
                    EQUIVS_BUILD_TIMEOUT.as_secs()
                )))
            }
        }
    }

    /// Install the built unit ignoring its own dependency requirements, so
    /// only the declared dependencies are left for the repair step.
    ///
    /// A non-zero exit is expected here when sub-dependencies are missing;
    /// it is logged, not raised.
    fn force_install(&self, deb: &Path) -> Result<()> {
        wait_for_lock(&self.paths)?;

        debug!("force-installing {}", deb.display());
        let output = Command::new("dpkg")
            .arg("--force-depends")
            .arg("-i")
            .arg(deb)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::ToolNotFound("dpkg".to_string())
                } else {
                    Error::IoError(format!("failed to run dpkg: {e}"))
                }
            })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("[dpkg] {}", line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            debug!("[dpkg] {}", line);
        }

        Ok(())
    }

    /// Resolve the declared dependencies with apt's automatic repair.
    ///
    /// On failure, extracts the problem names from the repair log, emits a
    /// simulated install of them to stderr, and fails fatally.
    fn repair_dependencies(&self, meta: &MetaPackage) -> Result<()> {
        let output = self.apt.fix_broken()?;
        let log = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        if output.status.success() {
            if self.dpkg.is_installed(meta.name())? {
                info!("meta-package {} installed", meta.name());
                return Ok(());
            }
            return Err(Error::DependencyResolutionFailed(format!(
                "{} does not report installed after dependency repair",
                meta.name()
            )));
        }

        let problems = diagnostics::extract_unresolved(&log, meta.name());
        if problems.is_empty() {
            return Err(Error::DependencyResolutionFailed(format!(
                "apt-get --fix-broken failed:\n{}",
                log.trim_end()
            )));
        }

        warn!("unable to resolve dependencies: {}", problems.join(", "));
        let problem_refs: Vec<&str> = problems.iter().map(String::as_str).collect();
        let simulated = self.apt.simulate_install(&problem_refs)?;
        eprint!("{}", String::from_utf8_lossy(&simulated.stdout));
        eprint!("{}", String::from_utf8_lossy(&simulated.stderr));

        Err(Error::DependencyResolutionFailed(format!(
            "unable to install dependencies: {}",
            problems.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(input: &str) -> DependencySpec {
        DependencySpec::parse(input).unwrap()
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = MetaPackage::new("", "1.0", spec("curl")).unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor(_)));
    }

    #[test]
    fn test_empty_version_rejected() {
        let err = MetaPackage::new("app-deps", "  ", spec("curl")).unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor(_)));
    }

    #[test]
    fn test_render_control_fields() {
        let meta = MetaPackage::new("myapp-deps", "2.1", spec("curl jq>=1.6")).unwrap();
        let control = meta.render_control();

        assert!(control.contains("Package: myapp-deps\n"));
        assert!(control.contains("Version: 2.1\n"));
        assert!(control.contains("Depends: curl, jq (>= 1.6)\n"));
        assert!(control.contains("Architecture: all\n"));
        assert!(control.starts_with("Section: misc\n"));
    }

    #[test]
    fn test_control_description_continuation_is_indented() {
        let meta = MetaPackage::new("myapp-deps", "1.0", spec("curl")).unwrap();
        let control = meta.render_control();

        let description_at = control.find("Description:").unwrap();
        for line in control[description_at..].lines().skip(1) {
            assert!(line.starts_with(' '), "continuation line '{line}' not indented");
        }
    }

    #[test]
    fn test_deb_file_name() {
        let meta = MetaPackage::new("myapp-deps", "1.0", spec("curl")).unwrap();
        assert_eq!(meta.deb_file_name(), "myapp-deps_1.0_all.deb");
    }
}
