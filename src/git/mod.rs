//! git command execution layer
//!
//! This module handles executing git commands and parsing their output.

pub mod constants;
mod executor;
/// Parser module (public for integration testing)
pub mod parser;

pub use executor::GitExecutor;
pub use parser::{PendingCommit, TreeEntry};
