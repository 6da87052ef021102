//! Error type shared by both synchronization directions

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while synchronizing Git and ClearCase
#[derive(Error, Debug)]
pub enum Error {
    #[error("{program} {} failed (exit code {exit_code}): {}", args.join(" "), stderr.trim())]
    CommandFailed {
        program: String,
        args: Vec<String>,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("{0} is not installed or not in PATH")]
    ToolNotFound(String),

    #[error("Failed to parse history: {0}")]
    Parse(String),

    #[error("File has been modified: {path}. Try rebasing.")]
    Conflict { path: String },

    #[error("There are uncommitted files in your git directory")]
    NotPristine,

    #[error("ClearCase view directory does not exist: {0}")]
    MissingClearCaseView(PathBuf),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Combined stdout and stderr of a failed command, empty for other errors
    ///
    /// Git prints some refusals (e.g. "nothing to commit") on stdout.
    pub fn command_output(&self) -> String {
        match self {
            Error::CommandFailed { stdout, stderr, .. } => format!("{stdout}{stderr}"),
            _ => String::new(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
