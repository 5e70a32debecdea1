//! Command implementations for the refmerge CLI
//!
//! Each command has its own module.

pub mod info;
pub mod resolve;

pub use resolve::ResolveArgs;
