//! Install operation
//!
//! Runs the install lifecycle for one request:
//!
//! 1. register hook contributors (they may choose the version name)
//! 2. resolve the installation prefix
//! 3. apply the conflict policy (proceed, confirm, skip)
//! 4. assemble the build configuration
//! 5. run before-install hooks
//! 6. run the builder
//! 7. classify the status and print guidance
//! 8. run after-install hooks
//! 9. remove the partial install, or rehash on success

use tracing::{debug, info};

use crate::builder::{BuildConfiguration, Builder};
use crate::config::Settings;
use crate::diagnose::{self, InstallOutcome};
use crate::error::{Result, VersoError};
use crate::hooks::{HookContext, HookContributor, HookRegistry};
use crate::prefix::{Conflict, InstallationPrefix};
use crate::prompt::Confirmation;
use crate::rehash::Rehasher;
use crate::request::InstallRequest;
use crate::transaction::{self, PrefixGuard};
use crate::versions::VersionLookup;

/// External services the install depends on
pub struct Collaborators {
    pub builder: Box<dyn Builder>,
    pub versions: Box<dyn VersionLookup>,
    pub rehasher: Box<dyn Rehasher>,
    pub confirmation: Box<dyn Confirmation>,
}

/// How an install run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Already installed and `--skip-existing` was given
    Skipped,
    /// The builder ran
    Finished(InstallOutcome),
}

impl Completion {
    pub fn exit_code(&self) -> i32 {
        match self {
            Completion::Skipped => 0,
            Completion::Finished(outcome) => outcome.status,
        }
    }
}

/// High-level install operation
pub struct InstallOperation<'a> {
    settings: &'a Settings,
    collaborators: &'a Collaborators,
    contributors: Vec<Box<dyn HookContributor>>,
}

impl<'a> InstallOperation<'a> {
    pub fn new(settings: &'a Settings, collaborators: &'a Collaborators) -> Self {
        Self {
            settings,
            collaborators,
            contributors: Vec::new(),
        }
    }

    /// Hook contributors, in registration order
    pub fn with_contributors(mut self, contributors: Vec<Box<dyn HookContributor>>) -> Self {
        self.contributors = contributors;
        self
    }

    /// Execute the install lifecycle
    pub fn execute(&self, request: &InstallRequest) -> Result<Completion> {
        let registry = HookRegistry::from_contributors(&self.contributors, request)?;
        debug!(
            before = registry.before_hooks().len(),
            after = registry.after_hooks().len(),
            "registered install hooks"
        );

        let prefix = InstallationPrefix::resolve(
            request,
            registry.version_name(),
            &self.settings.versions_dir(),
        );
        debug!(
            version = %prefix.version_name,
            prefix = %prefix.path.display(),
            already_exists = prefix.already_exists,
            bin_exists = prefix.bin_exists,
            "resolved installation prefix"
        );

        match prefix.conflict(request) {
            Conflict::Skip => {
                debug!("already installed, skipping");
                return Ok(Completion::Skipped);
            }
            Conflict::Confirm => self.confirm_overwrite(&prefix)?,
            Conflict::None | Conflict::Overwrite => {}
        }

        let config = BuildConfiguration::new(
            self.settings,
            request,
            &prefix,
            self.collaborators.versions.global(),
        );
        debug!(?config, "build configuration");

        let mut guard = PrefixGuard::acquire(&prefix.path, prefix.already_exists);
        let mut ctx = HookContext {
            definition: request.definition.clone(),
            version_name: prefix.version_name.clone(),
            prefix: prefix.path.clone(),
            status: None,
        };

        registry.run_before(&ctx)?;

        let builder = &self.collaborators.builder;
        let status = builder.build(&config, &request.definition, &prefix.path)?;
        transaction::check_interrupted()?;

        let outcome = InstallOutcome::from_status(status);
        info!(status, classified = ?outcome.classified, "build finished");
        diagnose::report(
            &outcome,
            &request.definition,
            || builder.definitions(),
            || builder.install_source(),
        );

        ctx.status = Some(status);
        registry.run_after(&ctx);

        if outcome.is_success() {
            guard.commit();
            self.collaborators.rehasher.rehash();
        } else if let Err(e) = guard.rollback() {
            eprintln!("Warning: {e}");
        }

        Ok(Completion::Finished(outcome))
    }

    fn confirm_overwrite(&self, prefix: &InstallationPrefix) -> Result<()> {
        eprintln!("verso: {} already exists", prefix.path.display());
        let proceed = self
            .collaborators
            .confirmation
            .confirm("continue with installation?")?;
        if proceed {
            Ok(())
        } else {
            Err(VersoError::ConflictDeclined {
                prefix: prefix.path.display().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests;
