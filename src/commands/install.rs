//! Install command CLI wrapper
//!
//! Reads settings, wires up the external collaborators and dispatches to
//! the list, version or install operation. All lifecycle logic lives in
//! `operations/install.rs`.

use tracing::debug;

use crate::builder::ExternalBuilder;
use crate::cli::InstallArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::hooks::{self, HookContributor};
use crate::operations::install::{Collaborators, InstallOperation};
use crate::prompt::TerminalConfirmation;
use crate::rehash::ExternalRehash;
use crate::request::Action;
use crate::transaction;
use crate::versions::{VersionFiles, VersionLookup};

/// Run install command, returning the process exit code
pub fn run(args: InstallArgs, settings: &Settings) -> Result<i32> {
    debug!(root = %settings.root.display(), "loaded settings");

    let versions = VersionFiles::new(&settings.root, &settings.dir);
    let action = Action::from_args(args, || versions.local())?;
    let builder = ExternalBuilder::locate(settings)?;

    let request = match action {
        Action::BuilderVersion => return super::version::run(&builder),
        Action::List => return super::list::run(&builder),
        Action::Install(request) => request,
    };

    let contributors: Vec<Box<dyn HookContributor>> = hooks::discover(&settings.hook_dirs())?
        .into_iter()
        .map(|hook| Box::new(hook) as Box<dyn HookContributor>)
        .collect();

    let collaborators = Collaborators {
        rehasher: Box::new(ExternalRehash::locate(settings)),
        builder: Box::new(builder),
        versions: Box::new(versions),
        confirmation: Box::new(TerminalConfirmation),
    };

    transaction::install_interrupt_handler()?;

    let completion = InstallOperation::new(settings, &collaborators)
        .with_contributors(contributors)
        .execute(&request)?;
    Ok(completion.exit_code())
}
