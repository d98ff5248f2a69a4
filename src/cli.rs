// src/cli.rs
//! CLI definitions for aptglue
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "aptglue")]
#[command(author = "Aptglue Contributors")]
#[command(version)]
#[command(about = "Installs, pins, and removes apt dependencies on behalf of application packages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage an application's dependency meta-package
    Deps {
        #[command(subcommand)]
        command: DepsCommands,
    },

    /// Manage extra package repositories
    Repo {
        #[command(subcommand)]
        command: RepoCommands,
    },

    /// Check whether a package is installed (exit code reflects the answer)
    Installed {
        /// Package name
        package: String,
    },

    /// Print the installed version of a package (empty if not installed)
    Version {
        /// Package name
        package: String,
    },

    /// Refresh the package index
    Update,

    /// Remove automatically installed packages that are no longer needed
    Autoremove {
        /// Also purge configuration files
        #[arg(long)]
        purge: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum DepsCommands {
    /// Install an application's dependencies through its meta-package
    Install {
        /// Application identifier
        #[arg(long)]
        app: String,

        /// Directory holding per-application manifests and settings
        #[arg(long, default_value = "/var/lib/aptglue/apps")]
        apps_dir: String,

        /// Dependency specification, e.g. "dep1 dep2>=2.0 dep4|dep5"
        #[arg(long)]
        packages: String,
    },

    /// Add dependencies on top of the ones already declared
    Add {
        /// Application identifier
        #[arg(long)]
        app: String,

        /// Directory holding per-application manifests and settings
        #[arg(long, default_value = "/var/lib/aptglue/apps")]
        apps_dir: String,

        /// Dependency specification to add
        #[arg(long)]
        packages: String,

        /// Replace the declared dependencies instead of merging
        #[arg(long)]
        replace: bool,
    },

    /// Purge an application's meta-package and unneeded dependencies
    Remove {
        /// Application identifier
        #[arg(long)]
        app: String,

        /// Directory holding per-application manifests and settings
        #[arg(long, default_value = "/var/lib/aptglue/apps")]
        apps_dir: String,
    },

    /// Install dependencies from a temporarily registered extra repository
    InstallExtra {
        /// Application identifier
        #[arg(long)]
        app: String,

        /// Directory holding per-application manifests and settings
        #[arg(long, default_value = "/var/lib/aptglue/apps")]
        apps_dir: String,

        /// Dependency specification
        #[arg(long)]
        packages: String,

        /// Repository base URI
        #[arg(long)]
        uri: String,

        /// Repository suite (e.g. bookworm)
        #[arg(long)]
        suite: String,

        /// Repository component (e.g. main)
        #[arg(long, default_value = "main")]
        component: String,

        /// Repository name (defaults to the application identifier)
        #[arg(long)]
        name: Option<String>,

        /// Signing key URL
        #[arg(long)]
        key: Option<String>,

        /// Pin priority for the repository origin
        #[arg(long)]
        priority: Option<i32>,
    },
}

#[derive(Subcommand)]
pub enum RepoCommands {
    /// Register an extra repository (source list + pin + key)
    Add {
        /// Repository name; keys the on-disk artifacts
        #[arg(long)]
        name: String,

        /// Repository base URI
        #[arg(long)]
        uri: String,

        /// Repository suite (e.g. bookworm)
        #[arg(long)]
        suite: String,

        /// Repository component (e.g. main)
        #[arg(long, default_value = "main")]
        component: String,

        /// Signing key URL
        #[arg(long)]
        key: Option<String>,

        /// Pin priority for the repository origin
        #[arg(long)]
        priority: Option<i32>,

        /// Append to an existing source list instead of overwriting
        #[arg(long)]
        append: bool,
    },

    /// Deregister an extra repository, removing all of its artifacts
    Remove {
        /// Repository name
        #[arg(long)]
        name: String,
    },

    /// Write a standalone pin preference
    Pin {
        /// Preference file name
        #[arg(long)]
        name: String,

        /// Package pattern the pin applies to
        #[arg(long, default_value = "*")]
        packages: String,

        /// Pin rule, e.g. "origin deb.example.org" or "release o=Debian"
        #[arg(long)]
        pin: String,

        /// Pin priority
        #[arg(long, default_value_t = aptglue::repository::DEFAULT_PIN_PRIORITY)]
        priority: i32,

        /// Append to an existing preference file instead of overwriting
        #[arg(long)]
        append: bool,
    },
}
