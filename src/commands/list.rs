//! List command implementation
//!
//! Prints every definition verso-build knows about.

use std::io;

use crate::builder::Builder;
use crate::error::Result;

/// Run list command, returning the lister's exit status
pub fn run(builder: &dyn Builder) -> Result<i32> {
    let mut stdout = io::stdout().lock();
    builder.list(&mut stdout)
}
