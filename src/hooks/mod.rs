//! Install hooks
//!
//! Hook contributors register callables that run before or after the build.
//! Registration happens exactly once per run, before the version name is
//! derived and before any hook executes, so a contributor may also pick the
//! version name. Hooks run in registration order.
//!
//! ## Usage
//!
//! ```ignore
//! let mut registry = HookRegistry::new();
//! registry.before_install("announce", |ctx| {
//!     println!("installing {}", ctx.version_name);
//!     Ok(())
//! });
//! registry.run_before(&ctx)?;
//! ```

pub mod discovery;

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::error::Result;
use crate::request::InstallRequest;

pub use discovery::discover;

/// State visible to a running hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookContext {
    pub definition: String,
    pub version_name: String,
    pub prefix: PathBuf,
    /// Builder exit status, only set for after-install hooks
    pub status: Option<i32>,
}

type HookFn = Box<dyn Fn(&HookContext) -> Result<()>>;

/// A named hook callable
pub struct Hook {
    name: String,
    action: HookFn,
}

impl Hook {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &HookContext) -> Result<()> {
        (self.action)(ctx)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook").field("name", &self.name).finish()
    }
}

/// Something that contributes install hooks
pub trait HookContributor {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Register this contributor's hooks
    fn register(&self, registry: &mut HookRegistry, request: &InstallRequest) -> Result<()>;
}

/// Ordered before/after install hooks
#[derive(Debug, Default)]
pub struct HookRegistry {
    before: Vec<Hook>,
    after: Vec<Hook>,
    version_name: Option<String>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every contributor in order
    pub fn from_contributors(
        contributors: &[Box<dyn HookContributor>],
        request: &InstallRequest,
    ) -> Result<Self> {
        let mut registry = Self::new();
        for contributor in contributors {
            debug!(hook = contributor.name(), "registering install hooks");
            contributor.register(&mut registry, request)?;
        }
        Ok(registry)
    }

    /// Add a hook that runs before the build
    pub fn before_install<F>(&mut self, name: impl Into<String>, action: F)
    where
        F: Fn(&HookContext) -> Result<()> + 'static,
    {
        self.before.push(Hook {
            name: name.into(),
            action: Box::new(action),
        });
    }

    /// Add a hook that runs after the build, whatever its status
    pub fn after_install<F>(&mut self, name: impl Into<String>, action: F)
    where
        F: Fn(&HookContext) -> Result<()> + 'static,
    {
        self.after.push(Hook {
            name: name.into(),
            action: Box::new(action),
        });
    }

    /// Choose the installed version name instead of deriving it from the
    /// definition
    pub fn set_version_name(&mut self, name: impl Into<String>) {
        self.version_name = Some(name.into());
    }

    pub fn version_name(&self) -> Option<&str> {
        self.version_name.as_deref()
    }

    pub fn before_hooks(&self) -> &[Hook] {
        &self.before
    }

    pub fn after_hooks(&self) -> &[Hook] {
        &self.after
    }

    /// Run before-install hooks, stopping at the first failure
    pub fn run_before(&self, ctx: &HookContext) -> Result<()> {
        for hook in &self.before {
            debug!(hook = hook.name(), "running before_install hook");
            hook.run(ctx)?;
        }
        Ok(())
    }

    /// Run after-install hooks; failures are reported and skipped
    pub fn run_after(&self, ctx: &HookContext) {
        for hook in &self.after {
            debug!(hook = hook.name(), "running after_install hook");
            if let Err(e) = hook.run(ctx) {
                debug!(hook = hook.name(), error = %e, "after_install hook failed");
                eprintln!("Warning: {e}");
            }
        }
    }
}
