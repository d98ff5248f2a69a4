// src/commands/repo.rs
//! Extra-repository commands

use anyhow::Result;
use aptglue::{ExtraRepository, RepositoryManager};
use tracing::info;

/// Register an extra repository
#[allow(clippy::too_many_arguments)]
pub fn cmd_repo_add(
    name: &str,
    uri: &str,
    suite: &str,
    component: &str,
    key: Option<String>,
    priority: Option<i32>,
    append: bool,
) -> Result<()> {
    info!("adding repository: {} ({})", name, uri);

    let mut repo = ExtraRepository::new(uri, suite, component, name);
    if let Some(key) = key {
        repo = repo.with_key_url(key);
    }
    if let Some(priority) = priority {
        repo = repo.with_pin_priority(priority);
    }
    if append {
        repo = repo.appending();
    }

    RepositoryManager::new().install(&repo)?;
    println!("Registered repository: {}", name);
    println!("  URI: {} {} {}", repo.uri, repo.suite, repo.component);
    Ok(())
}

/// Deregister an extra repository
pub fn cmd_repo_remove(name: &str) -> Result<()> {
    info!("removing repository: {}", name);
    RepositoryManager::new().remove(name)?;
    println!("Removed repository: {}", name);
    Ok(())
}

/// Write a standalone pin preference
pub fn cmd_repo_pin(
    name: &str,
    packages: &str,
    pin: &str,
    priority: i32,
    append: bool,
) -> Result<()> {
    info!("pinning '{}' at priority {}", pin, priority);
    RepositoryManager::new().pin(name, packages, pin, priority, append)?;
    println!("Pinned '{}' at priority {}", pin, priority);
    Ok(())
}
