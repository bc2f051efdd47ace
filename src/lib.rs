//! Builds release changelogs from the pull requests and commits between two
//! tags on GitHub, Gitea or a plain git checkout.

pub mod changelog;
pub mod config;
pub mod environment;
pub mod error;
pub mod git;
pub mod outputs;
pub mod provider;

pub use error::{ChangelogError, Result};
