// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::io;

mod cli;
mod commands;

use cli::{Cli, Commands, DepsCommands, RepoCommands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Deps { command } => match command {
            DepsCommands::Install {
                app,
                apps_dir,
                packages,
            } => commands::cmd_deps_install(&app, &apps_dir, &packages),
            DepsCommands::Add {
                app,
                apps_dir,
                packages,
                replace,
            } => commands::cmd_deps_add(&app, &apps_dir, &packages, replace),
            DepsCommands::Remove { app, apps_dir } => {
                commands::cmd_deps_remove(&app, &apps_dir)
            }
            DepsCommands::InstallExtra {
                app,
                apps_dir,
                packages,
                uri,
                suite,
                component,
                name,
                key,
                priority,
            } => commands::cmd_deps_install_extra(
                &app, &apps_dir, &packages, &uri, &suite, &component, name, key, priority,
            ),
        },
        Commands::Repo { command } => match command {
            RepoCommands::Add {
                name,
                uri,
                suite,
                component,
                key,
                priority,
                append,
            } => commands::cmd_repo_add(&name, &uri, &suite, &component, key, priority, append),
            RepoCommands::Remove { name } => commands::cmd_repo_remove(&name),
            RepoCommands::Pin {
                name,
                packages,
                pin,
                priority,
                append,
            } => commands::cmd_repo_pin(&name, &packages, &pin, priority, append),
        },
        Commands::Installed { package } => {
            if !commands::cmd_installed(&package)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Version { package } => commands::cmd_version(&package),
        Commands::Update => commands::cmd_update(),
        Commands::Autoremove { purge } => commands::cmd_autoremove(purge),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "aptglue", &mut io::stdout());
            Ok(())
        }
    }
}
