// src/repository/keys.rs

//! Signing-key fetch and installation
//!
//! Keys are fetched over HTTP with a bounded timeout and retry count,
//! converted from armored to binary form with `gpg --dearmor`, and written
//! into the trusted-keys directory under the repository name.

use crate::error::{Error, Result};
use crate::repository::sources::AptEtc;
use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

/// Bound on the network wait for a key fetch
const KEY_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum retry attempts for a failed key fetch
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

/// Bound on the external key-format conversion
const GPG_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch a signing key and install it as `<name>.gpg`.
///
/// Armored input is converted to the binary key format; input that is
/// already binary is written through unchanged.
pub fn install_key(etc: &AptEtc, name: &str, key_url: &str) -> Result<()> {
    let data = fetch_key(key_url)?;
    let binary = if looks_armored(&data) {
        dearmor(&data)?
    } else {
        data
    };

    fs::create_dir_all(&etc.trusted_keys_dir)?;
    let path = etc.trusted_key_path(name, "gpg");
    fs::write(&path, binary)?;

    info!("installed signing key {}", path.display());
    Ok(())
}

/// Download the key bytes with bounded timeout and retries
fn fetch_key(key_url: &str) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(KEY_FETCH_TIMEOUT)
        .build()
        .map_err(|e| Error::DownloadError(format!("failed to create HTTP client: {e}")))?;

    let mut last_error = String::new();
    for attempt in 1..=MAX_RETRIES {
        debug!("fetching signing key from {} (attempt {}/{})", key_url, attempt, MAX_RETRIES);

        let result = client
            .get(key_url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.bytes());

        match result {
            Ok(bytes) => return Ok(bytes.to_vec()),
            Err(e) => {
                warn!("key fetch attempt {}/{} failed: {}", attempt, MAX_RETRIES, e);
                last_error = e.to_string();
                if attempt < MAX_RETRIES {
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS));
                }
            }
        }
    }

    Err(Error::DownloadError(format!(
        "failed to fetch signing key from {key_url}: {last_error}"
    )))
}

/// True if the key data is in ASCII-armored form
fn looks_armored(data: &[u8]) -> bool {
    data.starts_with(b"-----BEGIN")
}

/// Convert an armored key to the binary format via `gpg --dearmor`
fn dearmor(data: &[u8]) -> Result<Vec<u8>> {
    let mut child = Command::new("gpg")
        .arg("--dearmor")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ToolNotFound("gpg".to_string())
            } else {
                Error::IoError(format!("failed to run gpg: {e}"))
            }
        })?;

    // Keys are a few kilobytes; the write fits the pipe buffer without a
    // concurrent reader, and dropping stdin sends EOF
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| Error::IoError("gpg stdin unavailable".to_string()))?;
    stdin.write_all(data)?;
    drop(stdin);

    match child.wait_timeout(GPG_TIMEOUT)? {
        Some(status) => {
            let output = child.wait_with_output()?;
            if status.success() {
                Ok(output.stdout)
            } else {
                Err(Error::CommandFailed(format!(
                    "gpg --dearmor exited with code {}: {}",
                    status.code().unwrap_or(-1),
                    String::from_utf8_lossy(&output.stderr).trim()
                )))
            }
        }
        None => {
            let _ = child.kill();
            Err(Error::CommandFailed(format!(
                "gpg --dearmor timed out after {} seconds",
                GPG_TIMEOUT.as_secs()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_armored() {
        assert!(looks_armored(b"-----BEGIN PGP PUBLIC KEY BLOCK-----\n..."));
        assert!(!looks_armored(&[0x99, 0x01, 0x0d, 0x04]));
        assert!(!looks_armored(b""));
    }
}
