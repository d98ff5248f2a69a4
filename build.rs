// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: application identifier
fn app_arg() -> Arg {
    Arg::new("app")
        .long("app")
        .required(true)
        .help("Application identifier")
}

/// Common argument: per-application state directory
fn apps_dir_arg() -> Arg {
    Arg::new("apps_dir")
        .long("apps-dir")
        .default_value("/var/lib/aptglue/apps")
        .help("Directory holding per-application manifests and settings")
}

fn build_cli() -> Command {
    Command::new("aptglue")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Aptglue Contributors")
        .about("Installs, pins, and removes apt dependencies on behalf of application packages")
        .subcommand_required(true)
        .subcommand(
            Command::new("deps-install")
                .about("Install an application's dependencies through its meta-package")
                .arg(app_arg())
                .arg(apps_dir_arg())
                .arg(
                    Arg::new("packages")
                        .long("packages")
                        .required(true)
                        .help("Dependency specification"),
                ),
        )
        .subcommand(
            Command::new("deps-add")
                .about("Add dependencies on top of the ones already declared")
                .arg(app_arg())
                .arg(apps_dir_arg())
                .arg(
                    Arg::new("packages")
                        .long("packages")
                        .required(true)
                        .help("Dependency specification to add"),
                )
                .arg(
                    Arg::new("replace")
                        .long("replace")
                        .action(clap::ArgAction::SetTrue)
                        .help("Replace the declared dependencies instead of merging"),
                ),
        )
        .subcommand(
            Command::new("deps-remove")
                .about("Purge an application's meta-package and unneeded dependencies")
                .arg(app_arg())
                .arg(apps_dir_arg()),
        )
        .subcommand(
            Command::new("repo-add")
                .about("Register an extra repository (source list + pin + key)")
                .arg(Arg::new("name").long("name").required(true).help("Repository name"))
                .arg(Arg::new("uri").long("uri").required(true).help("Repository base URI"))
                .arg(Arg::new("suite").long("suite").required(true).help("Repository suite"))
                .arg(
                    Arg::new("component")
                        .long("component")
                        .default_value("main")
                        .help("Repository component"),
                )
                .arg(Arg::new("key").long("key").help("Signing key URL"))
                .arg(Arg::new("priority").long("priority").help("Pin priority")),
        )
        .subcommand(
            Command::new("repo-remove")
                .about("Deregister an extra repository, removing all of its artifacts")
                .arg(Arg::new("name").long("name").required(true).help("Repository name")),
        )
        .subcommand(
            Command::new("installed")
                .about("Check whether a package is installed")
                .arg(Arg::new("package").required(true).help("Package name")),
        )
        .subcommand(
            Command::new("version")
                .about("Print the installed version of a package")
                .arg(Arg::new("package").required(true).help("Package name")),
        )
        .subcommand(Command::new("update").about("Refresh the package index"))
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("aptglue.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
        return;
    }

    println!("cargo:warning=Man page generated at {}", man_path.display());
}
