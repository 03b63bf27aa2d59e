//! Command implementations for the install CLI

pub mod install;
pub mod list;
pub mod version;
