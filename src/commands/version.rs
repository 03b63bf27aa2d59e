//! Builder version command
//!
//! `--version` reports the version of verso-build, not of this binary.

use crate::builder::Builder;
use crate::error::Result;

/// Run the builder's version query, returning its exit status
pub fn run(builder: &dyn Builder) -> Result<i32> {
    builder.version()
}
