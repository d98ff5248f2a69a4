// src/dpkg/lock.rs

//! Polling wait for exclusive availability of the dpkg database
//!
//! The lock is owned by apt/dpkg, never by us: the waiter only observes it
//! with an advisory `flock` probe and releases the probe immediately.
//! Between a successful probe and the mutating command that follows, another
//! process can reacquire the lock; that race window is inherent to the
//! design, since apt must take the lock itself.
//!
//! While the lock is free the waiter also inspects dpkg's pending-update
//! staging directory. A purely numeric filename there means a previous dpkg
//! run was interrupted mid-transaction; that state requires manual operator
//! intervention and is reported as a distinct fatal error.

use crate::dpkg::DpkgPaths;
use crate::error::{Error, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Maximum polling attempts before giving up
const MAX_ATTEMPTS: u32 = 17;

/// Base sleep unit; failed attempt `n` sleeps `n * n` units
const BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Outcome of a lock wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// The lock was observed free and the database is consistent
    Ready,
    /// All attempts were exhausted with the lock still held. Callers
    /// historically proceed anyway; the variant exists so they can choose
    /// to hard-fail instead.
    TimedOut,
}

/// Polling waiter over the dpkg lock files
pub struct LockWaiter {
    paths: DpkgPaths,
    max_attempts: u32,
    backoff_unit: Duration,
}

impl LockWaiter {
    /// Create a waiter with the default attempt count and backoff
    pub fn new(paths: DpkgPaths) -> Self {
        Self {
            paths,
            max_attempts: MAX_ATTEMPTS,
            backoff_unit: BACKOFF_UNIT,
        }
    }

    /// Override the maximum number of polling attempts
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Override the backoff unit (tests use milliseconds)
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Poll until the dpkg database is free, the attempts are exhausted,
    /// or an interrupted database is detected.
    ///
    /// Failed attempt `n` sleeps `n^2` backoff units, so the worst-case
    /// wait is bounded by the sum of squares over all attempts.
    pub fn wait(&self) -> Result<LockState> {
        for attempt in 1..=self.max_attempts {
            if !self.database_busy() {
                self.check_interrupted()?;
                return Ok(LockState::Ready);
            }

            tracing::debug!(
                "dpkg database is locked, waiting (attempt {}/{})",
                attempt,
                self.max_attempts
            );
            thread::sleep(self.backoff_unit * (attempt * attempt));
        }

        tracing::warn!(
            "dpkg database still locked after {} attempts, proceeding anyway",
            self.max_attempts
        );
        Ok(LockState::TimedOut)
    }

    /// True if any of the dpkg lock files is currently held
    fn database_busy(&self) -> bool {
        self.paths.lock_files.iter().any(|p| lock_file_held(p))
    }

    /// Detect an interrupted dpkg run from its staging directory.
    ///
    /// dpkg stages pending database updates as numerically named journal
    /// files; any left behind means a run died mid-transaction.
    fn check_interrupted(&self) -> Result<()> {
        let entries = match fs::read_dir(&self.paths.updates_dir) {
            Ok(entries) => entries,
            // No staging directory at all means nothing is pending
            Err(_) => return Ok(()),
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
                return Err(Error::LockInterrupted);
            }
        }

        Ok(())
    }
}

/// Check whether a lock file is held by any process.
///
/// Non-destructive: takes the flock briefly and releases it. A missing or
/// unreadable file counts as free, matching dpkg's own behavior of creating
/// the lock on demand.
fn lock_file_held(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };

    match file.try_lock_exclusive() {
        Ok(()) => {
            let _ = file.unlock();
            false
        }
        Err(_) => true,
    }
}

/// Wait for the dpkg database with default settings
pub fn wait_for_lock(paths: &DpkgPaths) -> Result<LockState> {
    LockWaiter::new(paths.clone()).wait()
}
