// src/commands/query.rs
//! Package query and maintenance commands

use anyhow::Result;
use aptglue::{AptRunner, Dpkg};

/// Report whether a package is installed; the returned flag drives the
/// process exit code
pub fn cmd_installed(package: &str) -> Result<bool> {
    let installed = Dpkg::new().is_installed(package)?;
    if installed {
        println!("{} is installed", package);
    } else {
        println!("{} is not installed", package);
    }
    Ok(installed)
}

/// Print the installed version of a package
pub fn cmd_version(package: &str) -> Result<()> {
    let version = Dpkg::new().installed_version(package)?;
    println!("{}", version);
    Ok(())
}

/// Refresh the package index
pub fn cmd_update() -> Result<()> {
    AptRunner::new().update()?;
    Ok(())
}

/// Remove packages nothing depends on anymore
pub fn cmd_autoremove(purge: bool) -> Result<()> {
    let apt = AptRunner::new();
    if purge {
        apt.autopurge(&[])?;
    } else {
        apt.autoremove()?;
    }
    Ok(())
}
