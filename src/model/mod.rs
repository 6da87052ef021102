//! Data models for gitcc
//!
//! Tool-independent structures: ClearCase history records, the groups they
//! are replayed as, Git file statuses and commit identities.

mod change;
mod file_status;
mod group;
mod identity;

pub use change::{ChangeKind, ChangeRecord, extended_path, subject_of};
pub use file_status::FileStatus;
pub use group::{ChangeGroup, group_changes};
pub use identity::{Identity, commit_date};
