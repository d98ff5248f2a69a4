// src/commands/deps.rs
//! Application dependency commands

use anyhow::Result;
use aptglue::{AppContext, DependencyInstaller, ExtraRepository};
use std::path::Path;
use tracing::info;

fn app_context(app: &str, apps_dir: &str) -> AppContext {
    AppContext::new(app, &Path::new(apps_dir).join(app))
}

/// Install an application's dependencies
pub fn cmd_deps_install(app: &str, apps_dir: &str, packages: &str) -> Result<()> {
    info!("installing dependencies for application: {}", app);
    let ctx = app_context(app, apps_dir);
    let installer = DependencyInstaller::new();
    installer.install_dependencies(&ctx, packages)?;
    println!("Installed dependencies for {}", app);
    Ok(())
}

/// Add dependencies to an application's existing set
pub fn cmd_deps_add(app: &str, apps_dir: &str, packages: &str, replace: bool) -> Result<()> {
    info!("adding dependencies for application: {}", app);
    let ctx = app_context(app, apps_dir);
    let installer = DependencyInstaller::new();
    installer.add_dependencies(&ctx, packages, replace)?;
    println!("Updated dependencies for {}", app);
    Ok(())
}

/// Remove an application's dependencies
pub fn cmd_deps_remove(app: &str, apps_dir: &str) -> Result<()> {
    info!("removing dependencies for application: {}", app);
    let ctx = app_context(app, apps_dir);
    let installer = DependencyInstaller::new();
    installer.remove_dependencies(&ctx)?;
    println!("Removed dependencies for {}", app);
    Ok(())
}

/// Install dependencies from a temporarily registered extra repository
#[allow(clippy::too_many_arguments)]
pub fn cmd_deps_install_extra(
    app: &str,
    apps_dir: &str,
    packages: &str,
    uri: &str,
    suite: &str,
    component: &str,
    name: Option<String>,
    key: Option<String>,
    priority: Option<i32>,
) -> Result<()> {
    info!("installing extra dependencies for application: {}", app);
    let ctx = app_context(app, apps_dir);

    let mut repo = ExtraRepository::new(uri, suite, component, name.unwrap_or_else(|| app.to_string()));
    if let Some(key) = key {
        repo = repo.with_key_url(key);
    }
    if let Some(priority) = priority {
        repo = repo.with_pin_priority(priority);
    }

    let installer = DependencyInstaller::new();
    installer.install_extra_dependencies(&ctx, &repo, packages)?;
    println!("Installed dependencies for {} from {}", app, repo.uri);
    Ok(())
}
