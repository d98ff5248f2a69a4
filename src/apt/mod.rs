// src/apt/mod.rs

//! Non-interactive apt-get wrapper
//!
//! Every invocation funnels through the lock waiter first, runs with a fixed
//! locale, suppressed prompts, and a bounded network retry count. Named
//! operations (update, install, remove, autoremove, autopurge) are thin
//! layers over [`AptRunner::run`].

use crate::dpkg::lock::wait_for_lock;
use crate::dpkg::DpkgPaths;
use crate::error::{Error, Result};
use std::process::{Command, Output, Stdio};
use tracing::{debug, info};

/// Bounded network retry count passed to apt
const ACQUIRE_RETRIES: u32 = 3;

/// Install policy: never remove other packages, keep existing configuration
/// files when the package ships a conflicting one
const INSTALL_POLICY: &[&str] = &[
    "--no-remove",
    "-o",
    "Dpkg::Options::=--force-confdef",
    "-o",
    "Dpkg::Options::=--force-confold",
];

/// apt-get runner with fixed non-interactive options
#[derive(Debug, Clone, Default)]
pub struct AptRunner {
    paths: DpkgPaths,
}

impl AptRunner {
    /// Runner against the live system paths
    pub fn new() -> Self {
        Self {
            paths: DpkgPaths::default(),
        }
    }

    /// Runner with injected dpkg paths (tests)
    pub fn with_paths(paths: DpkgPaths) -> Self {
        Self { paths }
    }

    /// Run an apt-get subcommand, streaming its output through.
    ///
    /// Waits for the dpkg lock first. A timed-out wait is logged by the
    /// waiter and the command proceeds anyway; apt acquires the lock itself.
    pub fn run(&self, subcommand: &str, args: &[&str]) -> Result<()> {
        wait_for_lock(&self.paths)?;

        debug!("running apt-get {} {:?}", subcommand, args);
        let status = self
            .base_command(subcommand)
            .args(args)
            .status()
            .map_err(|e| spawn_error("apt-get", e))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::AptFailed {
                command: subcommand.to_string(),
                code: status.code().unwrap_or(-1),
            })
        }
    }

    /// Run an apt-get subcommand and capture its output.
    ///
    /// The exit status is left in the returned [`Output`] so callers can
    /// parse diagnostics out of a failed run.
    pub fn run_captured(&self, subcommand: &str, args: &[&str]) -> Result<Output> {
        wait_for_lock(&self.paths)?;

        debug!("running apt-get {} {:?} (captured)", subcommand, args);
        self.base_command(subcommand)
            .args(args)
            .output()
            .map_err(|e| spawn_error("apt-get", e))
    }

    /// Refresh the package index
    pub fn update(&self) -> Result<()> {
        info!("refreshing package index");
        self.run("update", &[])
    }

    /// Install packages under the fixed install policy
    pub fn install(&self, packages: &[&str]) -> Result<()> {
        info!("installing packages: {}", packages.join(" "));
        self.run("install", &install_args(packages))
    }

    /// Repair broken dependencies left by a force-install, capturing the
    /// output for diagnostic parsing
    pub fn fix_broken(&self) -> Result<Output> {
        info!("repairing broken dependencies");
        let mut args = vec!["--fix-broken"];
        args.extend_from_slice(INSTALL_POLICY);
        self.run_captured("install", &args)
    }

    /// Simulate an install to surface the underlying resolution failure
    pub fn simulate_install(&self, packages: &[&str]) -> Result<Output> {
        let mut args = vec!["--dry-run", "--verbose-versions"];
        args.extend_from_slice(packages);
        self.run_captured("install", &args)
    }

    /// Remove packages
    pub fn remove(&self, packages: &[&str]) -> Result<()> {
        info!("removing packages: {}", packages.join(" "));
        self.run("remove", packages)
    }

    /// Remove automatically installed packages that are no longer needed
    pub fn autoremove(&self) -> Result<()> {
        self.run("autoremove", &[])
    }

    /// Purge packages together with everything only they pulled in
    pub fn autopurge(&self, packages: &[&str]) -> Result<()> {
        info!("purging packages: {}", packages.join(" "));
        let mut args = vec!["--purge"];
        args.extend_from_slice(packages);
        self.run("autoremove", &args)
    }

    fn base_command(&self, subcommand: &str) -> Command {
        let mut cmd = Command::new("apt-get");
        cmd.env("LC_ALL", "C")
            .env("DEBIAN_FRONTEND", "noninteractive")
            .arg("--assume-yes")
            .arg("--quiet")
            .arg("-o")
            .arg(format!("Acquire::Retries={ACQUIRE_RETRIES}"))
            .arg("-o")
            .arg("Dpkg::Use-Pty=0")
            .arg(subcommand)
            .stdin(Stdio::null());
        cmd
    }
}

/// Arguments for an install under the fixed policy
fn install_args<'a>(packages: &[&'a str]) -> Vec<&'a str> {
    let mut args: Vec<&str> = INSTALL_POLICY.to_vec();
    args.extend_from_slice(packages);
    args
}

fn spawn_error(tool: &str, e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        Error::ToolNotFound(tool.to_string())
    } else {
        Error::IoError(format!("failed to run {tool}: {e}"))
    }
}
