//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{CommandFactory, Parser};

use crate::error::VersoError;

/// Install a version using verso-build
#[derive(Parser, Debug, Default)]
#[command(
    name = "verso-install",
    bin_name = "verso install",
    disable_version_flag = true,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    override_usage = "verso install [-f|-s] [-kpvg] <version>\n       \
                      verso install [-f|-s] [-kpvg] <definition-file>\n       \
                      verso install -l|--list\n       \
                      verso install --version",
    about = "Install a version using verso-build",
    after_help = "\x1b[1m\x1b[32mEnvironment:\x1b[0m\n    \
                  VERSO_BUILD_ROOT        Keep build sources under this directory\n    \
                  VERSO_BUILD_CACHE_PATH  Reuse downloads from this directory\n    \
                  VERSO_HOOK_PATH         Extra directories searched for install hooks\n\n\
                  \x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  verso install 3.3.0\n    \
                  verso install -s 3.3.0\n    \
                  verso install -k ./definitions/3.3.0-custom\n    \
                  patch -p1 < fix.patch | verso install -p 3.3.0"
)]
pub struct InstallArgs {
    /// Version to install, or path to a build definition file.
    /// Defaults to the local version when omitted.
    pub definition: Option<String>,

    /// List all available versions
    #[arg(long, short = 'l')]
    pub list: bool,

    /// Install even if the version appears to be installed already
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Skip if the version appears to be installed already
    #[arg(long, short = 's')]
    pub skip_existing: bool,

    /// Keep source tree after installation
    #[arg(long, short = 'k')]
    pub keep: bool,

    /// Apply a patch from stdin before building
    #[arg(long, short = 'p')]
    pub patch: bool,

    /// Verbose mode: print compilation status to stdout
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Build a debug version
    #[arg(long, short = 'g')]
    pub debug: bool,

    /// Show version of verso-build
    #[arg(long)]
    pub version: bool,
}

/// Usage text printed alongside usage errors
pub fn usage() -> String {
    InstallArgs::command().render_usage().to_string()
}

/// Convert a clap parse failure into a usage error.
///
/// Only the first line of clap's report is kept; the usage text is added
/// when the error is printed.
pub fn usage_error(err: &clap::Error) -> VersoError {
    let rendered = err.render().to_string();
    let message = rendered
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default();
    VersoError::Usage {
        message: message.trim_start_matches("error: ").trim().to_string(),
    }
}
