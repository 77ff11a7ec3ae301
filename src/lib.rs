//! nbcollection-ci: CI helper for notebook repositories
//!
//! Locates or clones a notebook repository, classifies how it was
//! referenced (local path, SSH remote, HTTPS remote, pull-request URL),
//! installs dependencies into its environment, and syncs generated files
//! back to the originating remote.

pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod repo;

pub use error::{CiError, Result};
