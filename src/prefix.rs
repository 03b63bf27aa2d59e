//! Installation prefix resolution and conflict policy

use std::path::{Path, PathBuf};

use crate::request::InstallRequest;

/// Suffix appended to the version name of debug builds
pub const DEBUG_SUFFIX: &str = "-debug";

/// Where a version will be installed, and what is already there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationPrefix {
    pub version_name: String,
    pub path: PathBuf,
    /// The prefix directory existed before this run
    pub already_exists: bool,
    /// The prefix holds a complete install (has a `bin` directory)
    pub bin_exists: bool,
}

impl InstallationPrefix {
    /// Resolve the prefix for `request` under `versions_dir`.
    ///
    /// `explicit_name` comes from hook contributors and is never replaced
    /// by the name derived from the definition.
    pub fn resolve(
        request: &InstallRequest,
        explicit_name: Option<&str>,
        versions_dir: &Path,
    ) -> Self {
        let mut version_name = explicit_name
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| derive_version_name(&request.definition));
        if request.debug {
            version_name.push_str(DEBUG_SUFFIX);
        }

        let path = versions_dir.join(&version_name);
        Self {
            already_exists: path.is_dir(),
            bin_exists: path.join("bin").is_dir(),
            version_name,
            path,
        }
    }

    /// Decide how to treat an existing installation
    pub fn conflict(&self, request: &InstallRequest) -> Conflict {
        if !self.bin_exists {
            Conflict::None
        } else if request.skip_existing {
            Conflict::Skip
        } else if request.force {
            Conflict::Overwrite
        } else {
            Conflict::Confirm
        }
    }
}

/// Outcome of the conflict policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    /// Nothing installed yet, or only a partial install
    None,
    /// Installed already; ask before continuing
    Confirm,
    /// Installed already; stop with success
    Skip,
    /// Installed already; install over it
    Overwrite,
}

/// Final path segment of a definition, or the definition itself
pub fn derive_version_name(definition: &str) -> String {
    definition
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(definition)
        .to_string()
}
