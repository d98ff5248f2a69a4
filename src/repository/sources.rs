// src/repository/sources.rs

//! The three on-disk artifacts of an extra repository
//!
//! A repository named `<name>` is realized as a source-list entry, a
//! pin-preference entry, and a trusted-key file, all keyed by the name.
//! Partial presence (a pin without a source, a key without a pin) is an
//! invariant violation, so the writers and the remover here are always
//! driven together by [`super::RepositoryManager`].

use crate::error::{Error, Result};
use crate::repository::ExtraRepository;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Default pin priority for general-purpose pins
pub const DEFAULT_PIN_PRIORITY: i32 = 50;

/// Locations of the apt configuration drop-in directories.
///
/// Defaults to the live `/etc/apt` layout; tests inject a layout rooted in
/// a temporary directory via [`AptEtc::under`].
#[derive(Debug, Clone)]
pub struct AptEtc {
    pub sources_dir: PathBuf,
    pub preferences_dir: PathBuf,
    pub trusted_keys_dir: PathBuf,
}

impl Default for AptEtc {
    fn default() -> Self {
        Self {
            sources_dir: PathBuf::from("/etc/apt/sources.list.d"),
            preferences_dir: PathBuf::from("/etc/apt/preferences.d"),
            trusted_keys_dir: PathBuf::from("/etc/apt/trusted.gpg.d"),
        }
    }
}

impl AptEtc {
    /// Build a layout rooted under `root` instead of `/`
    pub fn under(root: &Path) -> Self {
        Self {
            sources_dir: root.join("etc/apt/sources.list.d"),
            preferences_dir: root.join("etc/apt/preferences.d"),
            trusted_keys_dir: root.join("etc/apt/trusted.gpg.d"),
        }
    }

    pub fn source_path(&self, name: &str) -> PathBuf {
        self.sources_dir.join(format!("{name}.list"))
    }

    pub fn preference_path(&self, name: &str) -> PathBuf {
        self.preferences_dir.join(name)
    }

    pub fn trusted_key_path(&self, name: &str, extension: &str) -> PathBuf {
        self.trusted_keys_dir.join(format!("{name}.{extension}"))
    }
}

/// Write (or append) the source-list entry for a repository
pub fn write_source(etc: &AptEtc, repo: &ExtraRepository) -> Result<()> {
    fs::create_dir_all(&etc.sources_dir)?;
    let path = etc.source_path(&repo.name);
    let line = format!("deb {} {} {}\n", repo.uri, repo.suite, repo.component);

    if repo.append && path.exists() {
        let mut file = OpenOptions::new().append(true).open(&path)?;
        file.write_all(line.as_bytes())?;
    } else {
        fs::write(&path, line)?;
    }

    info!("registered package source {}", path.display());
    Ok(())
}

/// Write (or append) a pin-preference entry
pub fn write_pin(
    etc: &AptEtc,
    name: &str,
    package: &str,
    pin: &str,
    priority: i32,
    append: bool,
) -> Result<()> {
    fs::create_dir_all(&etc.preferences_dir)?;
    let path = etc.preference_path(name);
    let block = format!("Package: {package}\nPin: {pin}\nPin-Priority: {priority}\n");

    if append && path.exists() {
        let mut file = OpenOptions::new().append(true).open(&path)?;
        file.write_all(format!("\n{block}").as_bytes())?;
    } else {
        fs::write(&path, block)?;
    }

    debug!("pinned '{}' at priority {} in {}", pin, priority, path.display());
    Ok(())
}

/// Extract the pin origin (host only, scheme and path stripped) from a
/// repository URI
pub fn pin_origin(uri: &str) -> Result<String> {
    let url = Url::parse(uri)
        .map_err(|e| Error::ParseError(format!("invalid repository URI '{uri}': {e}")))?;
    url.host_str()
        .map(str::to_string)
        .ok_or_else(|| Error::ParseError(format!("repository URI '{uri}' has no host")))
}

/// Remove every artifact of a named repository.
///
/// Best-effort: a file that is already absent is a no-op, never an error.
pub fn remove_artifacts(etc: &AptEtc, name: &str) -> Result<()> {
    let paths = [
        etc.source_path(name),
        etc.preference_path(name),
        etc.trusted_key_path(name, "gpg"),
        etc.trusted_key_path(name, "asc"),
    ];

    for path in paths {
        match fs::remove_file(&path) {
            Ok(()) => info!("removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::IoError(format!(
                    "failed to remove {}: {e}",
                    path.display()
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo(name: &str) -> ExtraRepository {
        ExtraRepository::new("https://packages.example.org/debian", "bookworm", "main", name)
    }

    #[test]
    fn test_write_source_content() {
        let temp = TempDir::new().unwrap();
        let etc = AptEtc::under(temp.path());

        write_source(&etc, &repo("extra")).unwrap();

        let content = fs::read_to_string(etc.source_path("extra")).unwrap();
        assert_eq!(
            content,
            "deb https://packages.example.org/debian bookworm main\n"
        );
    }

    #[test]
    fn test_write_source_overwrites_by_default() {
        let temp = TempDir::new().unwrap();
        let etc = AptEtc::under(temp.path());

        write_source(&etc, &repo("extra")).unwrap();
        write_source(&etc, &repo("extra")).unwrap();

        let content = fs::read_to_string(etc.source_path("extra")).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_write_source_append() {
        let temp = TempDir::new().unwrap();
        let etc = AptEtc::under(temp.path());

        write_source(&etc, &repo("extra")).unwrap();
        let mut second = repo("extra");
        second.suite = "bookworm-backports".to_string();
        second.append = true;
        write_source(&etc, &second).unwrap();

        let content = fs::read_to_string(etc.source_path("extra")).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("bookworm-backports"));
    }

    #[test]
    fn test_write_pin_content() {
        let temp = TempDir::new().unwrap();
        let etc = AptEtc::under(temp.path());

        write_pin(&etc, "extra", "*", "origin packages.example.org", 600, false).unwrap();

        let content = fs::read_to_string(etc.preference_path("extra")).unwrap();
        assert_eq!(
            content,
            "Package: *\nPin: origin packages.example.org\nPin-Priority: 600\n"
        );
    }

    #[test]
    fn test_write_pin_append_separates_blocks() {
        let temp = TempDir::new().unwrap();
        let etc = AptEtc::under(temp.path());

        write_pin(&etc, "extra", "*", "origin a.example.org", 50, false).unwrap();
        write_pin(&etc, "extra", "php*", "origin b.example.org", 600, true).unwrap();

        let content = fs::read_to_string(etc.preference_path("extra")).unwrap();
        assert!(content.contains("\n\nPackage: php*\n"));
    }

    #[test]
    fn test_pin_origin_strips_scheme_and_path() {
        assert_eq!(
            pin_origin("https://packages.sury.org/php/").unwrap(),
            "packages.sury.org"
        );
        assert_eq!(
            pin_origin("http://deb.example.org/debian/pool").unwrap(),
            "deb.example.org"
        );
    }

    #[test]
    fn test_pin_origin_rejects_hostless_uri() {
        assert!(pin_origin("not a uri").is_err());
        assert!(pin_origin("file:///srv/repo").is_err());
    }

    #[test]
    fn test_remove_artifacts_is_complete_and_reentrant() {
        let temp = TempDir::new().unwrap();
        let etc = AptEtc::under(temp.path());

        write_source(&etc, &repo("extra")).unwrap();
        write_pin(&etc, "extra", "*", "origin packages.example.org", 50, false).unwrap();
        fs::create_dir_all(&etc.trusted_keys_dir).unwrap();
        fs::write(etc.trusted_key_path("extra", "gpg"), b"key").unwrap();
        fs::write(etc.trusted_key_path("extra", "asc"), b"key").unwrap();

        remove_artifacts(&etc, "extra").unwrap();

        assert!(!etc.source_path("extra").exists());
        assert!(!etc.preference_path("extra").exists());
        assert!(!etc.trusted_key_path("extra", "gpg").exists());
        assert!(!etc.trusted_key_path("extra", "asc").exists());

        // Absent files are a no-op
        remove_artifacts(&etc, "extra").unwrap();
        remove_artifacts(&etc, "never-installed").unwrap();
    }
}
