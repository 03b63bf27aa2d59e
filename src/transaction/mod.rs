//! Cleanup of partially installed prefixes
//!
//! A [`PrefixGuard`] is taken once the install is committed to running. If
//! the guard is dropped without [`PrefixGuard::commit`], the prefix is
//! removed, unless it existed before the install started.
//!
//! ## Usage
//!
//! ```ignore
//! let guard = PrefixGuard::acquire(&prefix.path, prefix.already_exists);
//!
//! // Build into the prefix...
//!
//! // On success:
//! guard.commit();
//!
//! // On failure or error (automatic via Drop if not committed):
//! // the prefix is removed when it did not exist before
//! ```
//!
//! SIGINT is covered as well once [`install_interrupt_handler`] has run: the
//! handler removes the pending prefix itself, or leaves that to the main
//! thread while a child process (the build) is running, since the child
//! receives the same signal and the main thread resumes when it exits.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::error::{EXIT_INTERRUPTED, Result, VersoError, fs as fs_error};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static CHILD_RUNNING: AtomicBool = AtomicBool::new(false);
static PENDING_CLEANUP: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Guard over an installation prefix
#[derive(Debug)]
pub struct PrefixGuard {
    path: PathBuf,
    /// The prefix existed before the install, so it is never removed
    preexisting: bool,
    /// Committed or rolled back
    settled: bool,
}

impl PrefixGuard {
    /// Take responsibility for `path`
    pub fn acquire(path: impl Into<PathBuf>, preexisting: bool) -> Self {
        let path = path.into();
        if !preexisting {
            set_pending(Some(path.clone()));
        }
        Self {
            path,
            preexisting,
            settled: false,
        }
    }

    /// Keep the prefix (prevent cleanup)
    pub fn commit(mut self) {
        self.settled = true;
        self.release();
    }

    /// Remove the prefix now if it did not exist before
    pub fn rollback(&mut self) -> Result<()> {
        if self.settled {
            return Ok(());
        }
        self.release();
        self.settled = true;
        if self.preexisting {
            debug!(prefix = %self.path.display(), "keeping pre-existing prefix");
            return Ok(());
        }
        remove_prefix(&self.path)
    }

    fn release(&self) {
        let mut pending = lock_pending();
        if pending.as_deref() == Some(self.path.as_path()) {
            *pending = None;
        }
    }
}

impl Drop for PrefixGuard {
    fn drop(&mut self) {
        if !self.settled {
            if let Err(e) = self.rollback() {
                eprintln!("Warning: Cleanup failed: {e}");
            }
        }
    }
}

/// Marks a child process as running for the lifetime of the value
#[derive(Debug)]
pub struct ChildScope(());

impl ChildScope {
    pub fn enter() -> Self {
        CHILD_RUNNING.store(true, Ordering::SeqCst);
        Self(())
    }
}

impl Drop for ChildScope {
    fn drop(&mut self) {
        CHILD_RUNNING.store(false, Ordering::SeqCst);
    }
}

/// Whether SIGINT has been received
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Fail with [`VersoError::Interrupted`] if SIGINT has been received
pub fn check_interrupted() -> Result<()> {
    if interrupted() {
        Err(VersoError::Interrupted)
    } else {
        Ok(())
    }
}

/// Install the SIGINT handler that cleans up the pending prefix
pub fn install_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        INTERRUPTED.store(true, Ordering::SeqCst);
        if CHILD_RUNNING.load(Ordering::SeqCst) {
            return;
        }
        let pending = lock_pending().take();
        if let Some(path) = pending {
            if let Err(e) = remove_prefix(&path) {
                eprintln!("Warning: Cleanup failed: {e}");
            }
        }
        std::process::exit(EXIT_INTERRUPTED);
    })
    .map_err(|e| fs_error::io_error(format!("Failed to install interrupt handler: {e}"), e))
}

fn set_pending(path: Option<PathBuf>) {
    *lock_pending() = path;
}

fn lock_pending() -> std::sync::MutexGuard<'static, Option<PathBuf>> {
    PENDING_CLEANUP
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn remove_prefix(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!(prefix = %path.display(), "removed partial install");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(fs_error::remove_failed(
            path.display().to_string(),
            e.to_string(),
        )),
    }
}
