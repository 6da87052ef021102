//! cleartool output parser
//!
//! Parses the output from cleartool commands into structured data.

mod activity;
mod diff;
mod element;
mod history;

pub use diff::DirectoryEntry;
pub use element::ElementVersion;


/// Parser for cleartool command output
pub struct Parser;
