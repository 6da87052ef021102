//! cleartool command execution layer
//!
//! This module handles executing cleartool commands and parsing their output.

pub mod constants;
mod executor;
/// Parser module (public for integration testing)
pub mod parser;

pub use executor::CcExecutor;

use serde::Deserialize;

use constants::formats;

/// Flavor of the ClearCase installation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CcMode {
    /// Base ClearCase: history carries comments inline
    #[default]
    Base,

    /// Unified Change Management: history carries activity names, check-ins
    /// happen inside an activity and are delivered to the integration stream
    Ucm,
}

impl CcMode {
    /// `-fmt` directive producing the comment field of a history record
    pub fn comment_format(&self) -> &'static str {
        match self {
            CcMode::Base => formats::COMMENT,
            CcMode::Ucm => formats::ACTIVITY,
        }
    }

    /// Full `-fmt` string for history queries
    pub fn history_format(&self) -> String {
        format!(
            "{}{}{}",
            formats::HISTORY_PREFIX,
            self.comment_format(),
            formats::NEWLINE
        )
    }
}
