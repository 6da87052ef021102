//! Change groups: runs of records replayed as one commit

use std::fmt;

use super::change::{ChangeRecord, subject_of};
use crate::error::Result;

/// Consecutive change records sharing an author and a subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeGroup {
    pub user: String,

    /// First line of `comment`
    pub subject: String,

    /// Commit message (resolved to the full text by [`ChangeGroup::resolve_comment`])
    pub comment: String,

    /// Date of the most recently appended member
    pub date: String,

    pub files: Vec<ChangeRecord>,
}

impl ChangeGroup {
    pub fn new(record: ChangeRecord) -> Self {
        let mut group = Self {
            user: record.user.clone(),
            subject: record.subject().to_string(),
            comment: record.comment.clone(),
            date: String::new(),
            files: Vec::new(),
        };
        group.append(record);
        group
    }

    /// Does `record` continue this group?
    pub fn accepts(&self, record: &ChangeRecord) -> bool {
        self.user == record.user && self.subject == record.subject()
    }

    pub fn append(&mut self, record: ChangeRecord) {
        self.date = record.date.clone();
        self.files.push(record);
    }

    /// Replace the comment with its full form and recompute the subject
    pub fn resolve_comment(&mut self, resolve: impl FnOnce(&str) -> Result<String>) -> Result<()> {
        self.comment = resolve(&self.comment)?;
        self.subject = subject_of(&self.comment).to_string();
        Ok(())
    }

    /// Element paths of all members, in replay order
    pub fn paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.file.clone()).collect()
    }
}

/// Dry-run listing: `user "subject"` followed by the indented member files
impl fmt::Display for ChangeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} \"{}\"", self.user, self.subject)?;
        for file in &self.files {
            writeln!(f, "  {}", file.file)?;
        }
        Ok(())
    }
}

/// Merge chronologically ordered records into groups
///
/// A record joins the previous group when both user and subject are equal;
/// otherwise it starts a new one. Order is preserved.
pub fn group_changes(records: impl IntoIterator<Item = ChangeRecord>) -> Vec<ChangeGroup> {
    let mut groups: Vec<ChangeGroup> = Vec::new();
    for record in records {
        match groups.last_mut() {
            Some(last) if last.accepts(&record) => last.append(record),
            _ => groups.push(ChangeGroup::new(record)),
        }
    }
    groups
}
