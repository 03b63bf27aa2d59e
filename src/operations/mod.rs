//! High-level operations
//!
//! [`install::InstallOperation`] coordinates hooks, the installation prefix,
//! the builder, cleanup and rehash for a single install request.

pub mod install;
