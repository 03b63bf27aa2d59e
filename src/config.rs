//! Settings read from the environment
//!
//! Every variable is read once into an immutable [`Settings`] value. Empty
//! values count as unset. Nothing here mutates the process environment:
//! variables meant for `verso-build` are handed to that child process
//! through [`crate::builder::BuildConfiguration`].

use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::{Result, config, fs};

/// Tool root directory
pub const ROOT_VAR: &str = "VERSO_ROOT";
/// Build root; when set, builds always keep their sources
pub const BUILD_ROOT_VAR: &str = "VERSO_BUILD_ROOT";
/// Build working directory handed to verso-build
pub const BUILD_PATH_VAR: &str = "VERSO_BUILD_BUILD_PATH";
/// Shared download cache handed to verso-build
pub const CACHE_PATH_VAR: &str = "VERSO_BUILD_CACHE_PATH";
/// Active version context exported to verso-build
pub const VERSION_VAR: &str = "VERSO_VERSION";
/// Debug trace toggle
pub const DEBUG_VAR: &str = "VERSO_DEBUG";
/// Hook search path
pub const HOOK_PATH_VAR: &str = "VERSO_HOOK_PATH";
/// Start directory for the local version file search
pub const DIR_VAR: &str = "VERSO_DIR";
/// Builder executable override
pub const BUILDER_BIN_VAR: &str = "VERSO_BUILD_BIN";
/// Rehash executable override
pub const REHASH_BIN_VAR: &str = "VERSO_REHASH_BIN";

/// Default root directory name under the user's home
const DEFAULT_ROOT_DIR: &str = ".verso";

/// Resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Tool root (`VERSO_ROOT`, default `~/.verso`)
    pub root: PathBuf,
    pub build_root: Option<PathBuf>,
    pub build_path: Option<PathBuf>,
    pub cache_path: Option<PathBuf>,
    /// Extra hook directories, searched before `<root>/verso.d`
    pub hook_path: Vec<PathBuf>,
    /// Directory the local version search starts from
    pub dir: PathBuf,
    pub builder: Option<PathBuf>,
    pub rehash: Option<PathBuf>,
    pub debug: bool,
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| fs::io_error(format!("Failed to get current directory: {e}"), e))?;
        Self::from_lookup(|key| std::env::var_os(key), dirs::home_dir(), cwd)
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F, home: Option<PathBuf>, cwd: PathBuf) -> Result<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let path = |key: &str| var(key).map(PathBuf::from);

        let root = match path(ROOT_VAR) {
            Some(root) => root,
            None => home
                .map(|home| home.join(DEFAULT_ROOT_DIR))
                .ok_or_else(|| {
                    config::invalid(format!(
                        "{ROOT_VAR} is not set and the home directory is unknown"
                    ))
                })?,
        };

        let hook_path = var(HOOK_PATH_VAR)
            .map(|value| {
                std::env::split_paths(&value)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let dir = path(DIR_VAR).unwrap_or(cwd);

        Ok(Self {
            root,
            build_root: path(BUILD_ROOT_VAR),
            build_path: path(BUILD_PATH_VAR),
            cache_path: path(CACHE_PATH_VAR),
            hook_path,
            dir,
            builder: path(BUILDER_BIN_VAR),
            rehash: path(REHASH_BIN_VAR),
            debug: var(DEBUG_VAR).is_some(),
        })
    }

    /// Directory holding installed versions
    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    /// Default build root used by `--keep` when none is configured
    pub fn default_build_root(&self) -> PathBuf {
        self.root.join("sources")
    }

    /// Shared cache directory under the root
    pub fn root_cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    /// Hook directories in search order
    pub fn hook_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = self.hook_path.clone();
        dirs.push(self.root.join("verso.d"));
        dirs
    }
}
