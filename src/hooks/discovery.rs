//! Hook manifest discovery
//!
//! Hooks for the install event live in `<dir>/install/*.yaml` for every
//! directory on the hook path. Directories are visited in order and the
//! manifests within one directory are sorted by file name.
//!
//! A manifest looks like this:
//!
//! ```yaml
//! version_name: 3.3.0-custom
//! before_install:
//!   - [mkdir, -p, /var/log/verso]
//! after_install:
//!   - [sh, -c, 'echo "$VERSO_INSTALL_PREFIX $VERSO_INSTALL_STATUS" >> /var/log/verso/installs']
//! ```
//!
//! Each step is an argv list run directly, without a shell.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use super::{HookContext, HookContributor, HookRegistry};
use crate::error::{Result, config, fs as fs_error, hook};
use crate::request::InstallRequest;

/// Event subdirectory holding install hooks
const INSTALL_EVENT_DIR: &str = "install";

/// Manifest file extension
const MANIFEST_EXTENSION: &str = "yaml";

/// Definition being installed
pub const DEFINITION_ENV: &str = "VERSO_DEFINITION";
/// Name of the version being installed
pub const VERSION_NAME_ENV: &str = "VERSO_VERSION_NAME";
/// Installation prefix
pub const PREFIX_ENV: &str = "VERSO_INSTALL_PREFIX";
/// Builder exit status, after-install hooks only
pub const STATUS_ENV: &str = "VERSO_INSTALL_STATUS";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct HookManifest {
    #[serde(default)]
    version_name: Option<String>,
    #[serde(default)]
    before_install: Vec<Vec<String>>,
    #[serde(default)]
    after_install: Vec<Vec<String>>,
}

/// Hooks declared by one manifest file
#[derive(Debug, Clone)]
pub struct ScriptHook {
    name: String,
    version_name: Option<String>,
    before: Vec<Vec<String>>,
    after: Vec<Vec<String>>,
}

impl ScriptHook {
    /// Load and validate a manifest
    pub fn load(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| fs_error::read_failed(&display, e.to_string()))?;
        let manifest: HookManifest = if content.trim().is_empty() {
            HookManifest::default()
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| config::manifest_invalid(&display, e.to_string()))?
        };

        let empty_step = manifest
            .before_install
            .iter()
            .chain(&manifest.after_install)
            .any(|argv| argv.first().is_none_or(|program| program.is_empty()));
        if empty_step {
            return Err(config::manifest_invalid(
                &display,
                "hook steps need a program to run",
            ));
        }

        Ok(Self {
            name: display,
            version_name: manifest.version_name.filter(|name| !name.is_empty()),
            before: manifest.before_install,
            after: manifest.after_install,
        })
    }
}

impl HookContributor for ScriptHook {
    fn name(&self) -> &str {
        &self.name
    }

    fn register(&self, registry: &mut HookRegistry, _request: &InstallRequest) -> Result<()> {
        if let Some(version_name) = &self.version_name {
            registry.set_version_name(version_name.clone());
        }
        for argv in &self.before {
            let (name, argv) = (self.name.clone(), argv.clone());
            registry.before_install(self.name.clone(), move |ctx| run_step(&name, &argv, ctx));
        }
        for argv in &self.after {
            let (name, argv) = (self.name.clone(), argv.clone());
            registry.after_install(self.name.clone(), move |ctx| run_step(&name, &argv, ctx));
        }
        Ok(())
    }
}

/// Run one hook step with the install context in its environment
fn run_step(name: &str, argv: &[String], ctx: &HookContext) -> Result<()> {
    let Some((program, args)) = argv.split_first() else {
        return Ok(());
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .env(DEFINITION_ENV, &ctx.definition)
        .env(VERSION_NAME_ENV, &ctx.version_name)
        .env(PREFIX_ENV, &ctx.prefix);
    if let Some(status) = ctx.status {
        command.env(STATUS_ENV, status.to_string());
    }

    debug!(hook = name, ?argv, "running hook step");
    let status = command
        .status()
        .map_err(|e| hook::failed(name, format!("could not run {program}: {e}")))?;

    if status.success() {
        Ok(())
    } else {
        Err(hook::failed(
            name,
            format!("{program} exited with {status}"),
        ))
    }
}

/// Find install hook manifests on the hook path, in registration order
pub fn discover(hook_dirs: &[PathBuf]) -> Result<Vec<ScriptHook>> {
    let mut hooks = Vec::new();
    for dir in hook_dirs {
        for path in manifests_in(&dir.join(INSTALL_EVENT_DIR))? {
            debug!(path = %path.display(), "found install hook");
            hooks.push(ScriptHook::load(&path)?);
        }
    }
    Ok(hooks)
}

fn manifests_in(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut manifests = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_manifest = path
            .extension()
            .is_some_and(|ext| ext == MANIFEST_EXTENSION);
        if is_manifest && path.is_file() {
            manifests.push(path);
        }
    }
    manifests.sort();
    Ok(manifests)
}
