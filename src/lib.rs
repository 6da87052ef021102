//! gitcc - bidirectional history bridge between Git and ClearCase
//!
//! This library provides:
//! - [`cc`]: cleartool command execution and history parsing
//! - [`git`]: git command execution and parsing
//! - [`model`]: change records, change groups and file statuses
//! - [`sync`]: rebase (ClearCase to Git) and checkin (Git to ClearCase)
//! - [`cache`]: last synchronized version of every file
//! - [`branch`]: branch and exclude filtering

pub mod branch;
pub mod cache;
pub mod cc;
pub mod config;
pub mod error;
pub mod exec;
pub mod git;
pub mod model;
pub mod sync;
pub mod workspace;

pub use error::{Error, Result};
