// src/app/mod.rs

//! Per-application context: identity, manifest, and settings store
//!
//! Every orchestration operation receives an explicit [`AppContext`] naming
//! the owning application; there is no ambient application state. The
//! context knows where the application's manifest and settings live and how
//! to derive the name of its dependency meta-package.

mod dependencies;

pub use dependencies::{DependencyInstaller, APT_DEPENDENCIES_SETTING};

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix of the synthetic dependency package derived from an app id
pub const META_PACKAGE_SUFFIX: &str = "-deps";

/// Version used when the application manifest declares none
const DEFAULT_VERSION: &str = "1.0";

#[derive(Deserialize)]
struct Manifest {
    version: Option<String>,
}

/// Identity and storage locations of one application
#[derive(Debug, Clone)]
pub struct AppContext {
    pub id: String,
    pub manifest_path: PathBuf,
    pub settings_path: PathBuf,
}

impl AppContext {
    /// Context for an application whose manifest and settings live under
    /// `app_dir`
    pub fn new(id: impl Into<String>, app_dir: &Path) -> Self {
        Self {
            id: id.into(),
            manifest_path: app_dir.join("manifest.json"),
            settings_path: app_dir.join("settings.json"),
        }
    }

    /// Name of the application's dependency meta-package: the app id with
    /// underscores replaced by hyphens plus a fixed suffix
    pub fn meta_package_name(&self) -> String {
        format!("{}{}", self.id.replace('_', "-"), META_PACKAGE_SUFFIX)
    }

    /// Version from the manifest's `"version"` field, with any packaging
    /// revision after `~` stripped. Falls back to "1.0" when the manifest
    /// is missing or declares no version.
    pub fn manifest_version(&self) -> String {
        let version = fs::read_to_string(&self.manifest_path)
            .ok()
            .and_then(|content| serde_json::from_str::<Manifest>(&content).ok())
            .and_then(|manifest| manifest.version);

        match version {
            Some(v) if !v.trim().is_empty() => {
                v.split('~').next().unwrap_or(DEFAULT_VERSION).to_string()
            }
            _ => {
                debug!(
                    "no version in {}, using {}",
                    self.manifest_path.display(),
                    DEFAULT_VERSION
                );
                DEFAULT_VERSION.to_string()
            }
        }
    }

    /// Read a setting from the application's key/value store
    pub fn setting(&self, key: &str) -> Result<Option<String>> {
        if !self.settings_path.exists() {
            return Ok(None);
        }
        let map = self.load_settings()?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    /// Persist a setting in the application's key/value store
    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let mut map = if self.settings_path.exists() {
            self.load_settings()?
        } else {
            Map::new()
        };
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.store_settings(&map)
    }

    /// Delete a setting; absent keys are a no-op
    pub fn remove_setting(&self, key: &str) -> Result<()> {
        if !self.settings_path.exists() {
            return Ok(());
        }
        let mut map = self.load_settings()?;
        if map.remove(key).is_some() {
            self.store_settings(&map)?;
        }
        Ok(())
    }

    fn load_settings(&self) -> Result<Map<String, Value>> {
        let content = fs::read_to_string(&self.settings_path)?;
        serde_json::from_str(&content).map_err(|e| {
            Error::ParseError(format!(
                "invalid settings file {}: {e}",
                self.settings_path.display()
            ))
        })
    }

    fn store_settings(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(map).map_err(|e| {
            Error::IoError(format!("failed to serialize settings: {e}"))
        })?;
        fs::write(&self.settings_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_meta_package_name_replaces_underscores() {
        let temp = TempDir::new().unwrap();
        let ctx = AppContext::new("my_cool_app", temp.path());
        assert_eq!(ctx.meta_package_name(), "my-cool-app-deps");
    }

    #[test]
    fn test_manifest_version_read() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("manifest.json"), r#"{"version": "2.4"}"#).unwrap();

        let ctx = AppContext::new("app", temp.path());
        assert_eq!(ctx.manifest_version(), "2.4");
    }

    #[test]
    fn test_manifest_version_strips_packaging_revision() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("manifest.json"), r#"{"version": "2.4~pkg3"}"#).unwrap();

        let ctx = AppContext::new("app", temp.path());
        assert_eq!(ctx.manifest_version(), "2.4");
    }

    #[test]
    fn test_manifest_version_defaults_when_missing() {
        let temp = TempDir::new().unwrap();
        let ctx = AppContext::new("app", temp.path());
        assert_eq!(ctx.manifest_version(), "1.0");

        fs::write(temp.path().join("manifest.json"), r#"{"name": "app"}"#).unwrap();
        assert_eq!(ctx.manifest_version(), "1.0");
    }

    #[test]
    fn test_settings_roundtrip() {
        let temp = TempDir::new().unwrap();
        let ctx = AppContext::new("app", temp.path());

        assert_eq!(ctx.setting("apt_dependencies").unwrap(), None);

        ctx.set_setting("apt_dependencies", "curl, jq (>= 1.6)").unwrap();
        assert_eq!(
            ctx.setting("apt_dependencies").unwrap().as_deref(),
            Some("curl, jq (>= 1.6)")
        );

        ctx.set_setting("other", "value").unwrap();
        assert_eq!(
            ctx.setting("apt_dependencies").unwrap().as_deref(),
            Some("curl, jq (>= 1.6)")
        );

        ctx.remove_setting("apt_dependencies").unwrap();
        assert_eq!(ctx.setting("apt_dependencies").unwrap(), None);
        assert_eq!(ctx.setting("other").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_remove_setting_absent_is_noop() {
        let temp = TempDir::new().unwrap();
        let ctx = AppContext::new("app", temp.path());
        ctx.remove_setting("never-set").unwrap();
    }
}
