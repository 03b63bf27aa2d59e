//! Local and global version lookup
//!
//! Both lookups are best effort: a missing or unreadable version file simply
//! means no version is configured.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Name of the per-project version file
pub const LOCAL_VERSION_FILE: &str = ".verso-version";

/// Name of the global version file under the root
pub const GLOBAL_VERSION_FILE: &str = "version";

/// Source of configured versions
pub trait VersionLookup {
    /// Version selected for the current directory
    fn local(&self) -> Option<String>;

    /// Version selected globally
    fn global(&self) -> Option<String>;
}

/// Version lookup backed by version files on disk
#[derive(Debug, Clone)]
pub struct VersionFiles {
    root: PathBuf,
    dir: PathBuf,
}

impl VersionFiles {
    pub fn new(root: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dir: dir.into(),
        }
    }

    /// Nearest local version file, searching upward from the start directory
    pub fn find_local_file(&self) -> Option<PathBuf> {
        self.dir
            .ancestors()
            .map(|dir| dir.join(LOCAL_VERSION_FILE))
            .find(|candidate| candidate.is_file())
    }
}

impl VersionLookup for VersionFiles {
    fn local(&self) -> Option<String> {
        self.find_local_file().and_then(|file| read_version_file(&file))
    }

    fn global(&self) -> Option<String> {
        read_version_file(&self.root.join(GLOBAL_VERSION_FILE))
    }
}

/// Read the first word of a version file
pub fn read_version_file(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => content.split_whitespace().next().map(str::to_string),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "version file not readable");
            None
        }
    }
}
