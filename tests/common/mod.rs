//! Common test utilities for verso-install integration tests

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{self, Child, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use assert_cmd::Command;
use tempfile::TempDir;

/// Stand-in for verso-build.
///
/// Appends its arguments and the build variables it received to
/// `builder.log` next to itself, then creates the prefix (the last
/// argument). `bin/` is only created when the build succeeds, and the exit
/// status comes from `FAKE_BUILD_STATUS`. `FAKE_BUILD_SLEEP` pauses the
/// build after `lib/` exists. `FAKE_DEFINITION_COUNT` replaces the
/// definition list with that many generated names.
const FAKE_BUILDER: &str = r#"#!/bin/sh
here=$(dirname "$0")
case "$1" in
  --definitions)
    if [ -n "${FAKE_DEFINITION_COUNT:-}" ]; then
      i=0
      while [ "$i" -lt "$FAKE_DEFINITION_COUNT" ]; do
        echo "3.$i.0"
        i=$((i + 1))
      done
      exit 0
    fi
    printf '3.2.2\n3.3.0\n\n3.3.0-preview1\n'
    exit 0
    ;;
  --version)
    echo "verso-build 20261001"
    exit 0
    ;;
esac
echo "$* BUILD_PATH=${VERSO_BUILD_BUILD_PATH:-} CACHE_PATH=${VERSO_BUILD_CACHE_PATH:-} VERSION=${VERSO_VERSION:-}" >> "$here/builder.log"
for prefix; do :; done
status=${FAKE_BUILD_STATUS:-0}
mkdir -p "$prefix/lib"
if [ -n "${FAKE_BUILD_SLEEP:-}" ]; then
  sleep "$FAKE_BUILD_SLEEP"
fi
if [ "$status" -eq 0 ]; then
  mkdir -p "$prefix/bin"
  touch "$prefix/bin/runtime"
fi
exit "$status"
"#;

const FAKE_REHASH: &str = r#"#!/bin/sh
echo rehashed >> "$(dirname "$0")/rehash.log"
"#;

/// Variables that would leak the developer's own setup into a test
const ISOLATED_VARS: &[&str] = &[
    "VERSO_BUILD_ROOT",
    "VERSO_BUILD_BUILD_PATH",
    "VERSO_BUILD_CACHE_PATH",
    "VERSO_VERSION",
    "VERSO_DEBUG",
    "VERSO_HOOK_PATH",
    "RUST_LOG",
];

/// A throwaway verso root with fake builder and rehash executables
pub struct TestRoot {
    pub temp: TempDir,
    /// `VERSO_ROOT`
    pub root: PathBuf,
    /// Holds the fake executables and their logs
    pub bin: PathBuf,
    /// `VERSO_DIR`, the project directory
    pub project: PathBuf,
}

impl TestRoot {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().join("root");
        let bin = temp.path().join("bin");
        let project = temp.path().join("project");
        for dir in [&root, &bin, &project] {
            fs::create_dir_all(dir).expect("Failed to create directory");
        }

        let test_root = Self {
            temp,
            root,
            bin,
            project,
        };
        test_root.write_executable("verso-build", FAKE_BUILDER);
        test_root.write_executable("verso-rehash", FAKE_REHASH);
        test_root
    }

    fn write_executable(&self, name: &str, script: &str) {
        let path = self.bin.join(name);
        fs::write(&path, script).expect("Failed to write script");
        let mut permissions = fs::metadata(&path)
            .expect("Failed to stat script")
            .permissions();
        permissions.set_mode(0o755);
        fs::set_permissions(&path, permissions).expect("Failed to chmod script");
    }

    /// verso-install with the environment pointed at this root
    pub fn command(&self) -> Command {
        Command::from(self.process())
    }

    /// Same as [`TestRoot::command`], for tests that manage the child
    /// process themselves
    pub fn process(&self) -> process::Command {
        let mut cmd = process::Command::new(verso_install_bin());
        for var in ISOLATED_VARS {
            cmd.env_remove(var);
        }
        cmd.env("HOME", self.temp.path())
            .env("VERSO_ROOT", &self.root)
            .env("VERSO_DIR", &self.project)
            .env("VERSO_BUILD_BIN", self.bin.join("verso-build"))
            .env("VERSO_REHASH_BIN", self.bin.join("verso-rehash"));
        cmd
    }

    pub fn prefix(&self, version: &str) -> PathBuf {
        self.root.join("versions").join(version)
    }

    /// Simulate a complete install of `version`
    pub fn create_installed(&self, version: &str) -> PathBuf {
        let prefix = self.prefix(version);
        fs::create_dir_all(prefix.join("bin")).expect("Failed to create prefix");
        fs::write(prefix.join("bin/runtime"), "installed").expect("Failed to write file");
        prefix
    }

    /// Write a file relative to the temp directory
    pub fn write_file(&self, path: impl AsRef<Path>, content: &str) -> PathBuf {
        let file_path = self.temp.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Lines the fake builder logged, one per build
    pub fn builder_calls(&self) -> Vec<String> {
        read_lines(&self.bin.join("builder.log"))
    }

    pub fn rehash_count(&self) -> usize {
        read_lines(&self.bin.join("rehash.log")).len()
    }
}

impl Default for TestRoot {
    fn default() -> Self {
        Self::new()
    }
}

/// Path to the verso-install binary under test
pub fn verso_install_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_verso-install"))
}

/// Poll `condition` until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    condition()
}

/// Wait for `child` to exit, killing it and returning `None` after `timeout`
pub fn wait_timeout(child: &mut Child, timeout: Duration) -> Option<ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().expect("Failed to poll child") {
            return Some(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return None;
        }
        thread::sleep(Duration::from_millis(20));
    }
}

/// Deliver SIGINT to `child`
pub fn interrupt(child: &Child) {
    let status = process::Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("Failed to run kill");
    assert!(status.success(), "kill -INT failed");
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|content| content.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
