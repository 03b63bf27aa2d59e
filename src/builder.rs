//! Delegation to the external verso-build builder
//!
//! The builder does the actual download, compile and install. This module
//! assembles the [`BuildConfiguration`] for one build and runs the builder
//! with it. Configuration reaches the child only through its argv and
//! environment; the current process environment is left alone.

use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Split, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};

use tracing::debug;

use crate::config::{
    BUILD_PATH_VAR, BUILDER_BIN_VAR, CACHE_PATH_VAR, ROOT_VAR, Settings, VERSION_VAR,
};
use crate::diagnose::InstallSource;
use crate::error::{EXIT_FAILURE, Result, build};
use crate::prefix::InstallationPrefix;
use crate::request::InstallRequest;
use crate::transaction::ChildScope;

/// Builder executable name looked up on PATH
pub const BUILDER_PROGRAM: &str = "verso-build";

/// Lazily produced definition names
pub type Definitions = Box<dyn Iterator<Item = String>>;

/// Everything one builder run needs, fixed before it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub root: PathBuf,
    pub keep: bool,
    pub verbose: bool,
    pub patch: bool,
    pub debug: bool,
    /// Build working directory (`VERSO_BUILD_BUILD_PATH`)
    pub build_path: Option<PathBuf>,
    /// Download cache (`VERSO_BUILD_CACHE_PATH`)
    pub cache_path: Option<PathBuf>,
    /// Active version exported as `VERSO_VERSION`; empty when unknown
    pub active_version: String,
}

impl BuildConfiguration {
    /// Assemble the configuration for installing `prefix`
    pub fn new(
        settings: &Settings,
        request: &InstallRequest,
        prefix: &InstallationPrefix,
        active_version: Option<String>,
    ) -> Self {
        let build_root = settings
            .build_root
            .clone()
            .or_else(|| request.keep.then(|| settings.default_build_root()));

        // Keep mode sticks whenever a build root is in effect
        let (keep, build_path) = match build_root {
            Some(build_root) => (true, Some(build_root.join(&prefix.version_name))),
            None => (request.keep, settings.build_path.clone()),
        };

        let cache_path = settings.cache_path.clone().or_else(|| {
            let cache_dir = settings.root_cache_dir();
            cache_dir.is_dir().then_some(cache_dir)
        });

        Self {
            root: settings.root.clone(),
            keep,
            verbose: request.verbose,
            patch: request.patch,
            debug: request.debug,
            build_path,
            cache_path,
            active_version: active_version.unwrap_or_default(),
        }
    }

    /// Flags passed to the builder ahead of the positional arguments
    pub fn flags(&self) -> Vec<&'static str> {
        [
            (self.keep, "-k"),
            (self.verbose, "-v"),
            (self.patch, "-p"),
            (self.debug, "-g"),
        ]
        .into_iter()
        .filter_map(|(set, flag)| set.then_some(flag))
        .collect()
    }

    /// Environment overrides for the builder process
    pub fn env(&self) -> Vec<(&'static str, OsString)> {
        let mut env = vec![
            (ROOT_VAR, self.root.clone().into_os_string()),
            (VERSION_VAR, OsString::from(&self.active_version)),
        ];
        if let Some(build_path) = &self.build_path {
            env.push((BUILD_PATH_VAR, build_path.clone().into_os_string()));
        }
        if let Some(cache_path) = &self.cache_path {
            env.push((CACHE_PATH_VAR, cache_path.clone().into_os_string()));
        }
        env
    }
}

/// The external builder
pub trait Builder {
    /// Build `definition` into `prefix`, returning the builder's exit status
    fn build(&self, config: &BuildConfiguration, definition: &str, prefix: &Path) -> Result<i32>;

    /// Available definition names
    fn definitions(&self) -> Result<Definitions>;

    /// Print the available definitions under a header, returning the
    /// lister's exit status
    fn list(&self, out: &mut dyn Write) -> Result<i32> {
        write_definitions(out, self.definitions()?)?;
        Ok(0)
    }

    /// Print the builder's own version, returning its exit status
    fn version(&self) -> Result<i32>;

    /// How the builder itself was installed
    fn install_source(&self) -> InstallSource;
}

/// Builder backed by the verso-build executable
#[derive(Debug, Clone)]
pub struct ExternalBuilder {
    program: PathBuf,
}

impl ExternalBuilder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Locate the builder from `VERSO_BUILD_BIN` or PATH
    pub fn locate(settings: &Settings) -> Result<Self> {
        if let Some(program) = &settings.builder {
            debug!(program = %program.display(), "using {BUILDER_BIN_VAR}");
            return Ok(Self::new(program));
        }
        which::which(BUILDER_PROGRAM)
            .map(Self::new)
            .map_err(|_| build::not_found())
    }

    fn command(&self) -> Command {
        Command::new(&self.program)
    }

    fn spawn_definitions(&self) -> Result<DefinitionLines> {
        let mut child = self
            .command()
            .arg("--definitions")
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| build::spawn_failed(self.program.display().to_string(), e.to_string()))?;
        let lines = child
            .stdout
            .take()
            .map(|stdout| BufReader::new(stdout).split(b'\n'));
        Ok(DefinitionLines { lines, child })
    }

    fn run(&self, mut command: Command) -> Result<i32> {
        let _child = ChildScope::enter();
        let status = command
            .status()
            .map_err(|e| build::spawn_failed(self.program.display().to_string(), e.to_string()))?;
        Ok(exit_code(status))
    }
}

impl Builder for ExternalBuilder {
    fn build(&self, config: &BuildConfiguration, definition: &str, prefix: &Path) -> Result<i32> {
        let mut command = self.command();
        command
            .args(config.flags())
            .arg(definition)
            .arg(prefix)
            .envs(config.env());
        debug!(
            program = %self.program.display(),
            flags = ?config.flags(),
            definition,
            prefix = %prefix.display(),
            "invoking builder"
        );
        self.run(command)
    }

    fn definitions(&self) -> Result<Definitions> {
        Ok(Box::new(self.spawn_definitions()?))
    }

    fn list(&self, out: &mut dyn Write) -> Result<i32> {
        let mut lines = self.spawn_definitions()?;
        write_definitions(out, &mut lines)?;
        lines.finish()
    }

    fn version(&self) -> Result<i32> {
        let mut command = self.command();
        command.arg("--version");
        self.run(command)
    }

    fn install_source(&self) -> InstallSource {
        let program = self
            .program
            .canonicalize()
            .unwrap_or_else(|_| self.program.clone());
        match program.parent().and_then(Path::parent) {
            Some(install_dir) => InstallSource::detect(install_dir),
            None => InstallSource::Unknown,
        }
    }
}

/// Definition names read line by line from `verso-build --definitions`.
///
/// Lines that are not valid UTF-8 are decoded lossily. The pipe is closed
/// before the lister is waited on.
struct DefinitionLines {
    lines: Option<Split<BufReader<ChildStdout>>>,
    child: Child,
}

impl DefinitionLines {
    /// Close the pipe and wait for the lister
    fn finish(&mut self) -> Result<i32> {
        self.lines = None;
        let status = self.child.wait()?;
        Ok(exit_code(status))
    }
}

impl Iterator for DefinitionLines {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let bytes = match self.lines.as_mut()?.next()? {
                Ok(bytes) => bytes,
                Err(e) => {
                    debug!(error = %e, "could not read definitions");
                    self.lines = None;
                    return None;
                }
            };
            let line = String::from_utf8_lossy(&bytes);
            let line = line.trim();
            if !line.is_empty() {
                return Some(line.to_string());
            }
        }
    }
}

impl Drop for DefinitionLines {
    fn drop(&mut self) {
        self.lines = None;
        let _ = self.child.wait();
    }
}

/// Write `definitions` under the `Available versions:` header
pub fn write_definitions(
    out: &mut dyn Write,
    definitions: impl Iterator<Item = String>,
) -> io::Result<()> {
    writeln!(out, "Available versions:")?;
    for definition in definitions {
        writeln!(out, "  {definition}")?;
    }
    out.flush()
}

/// Exit code of a finished child, `128 + signal` when it was killed
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    EXIT_FAILURE
}
