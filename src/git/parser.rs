//! git output parser
//!
//! Parses the NUL-separated output of the git plumbing used by the write path.

use crate::error::{Error, Result};
use crate::model::FileStatus;

use super::constants::formats::CHECKIN_LOG_SEPARATOR;

/// A commit waiting to be checked in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommit {
    pub id: String,
    /// Raw message, trimmed
    pub message: String,
}

/// Mode and object id of one `ls-tree` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: String,
    pub id: String,
}

/// Parser for git command output
pub struct Parser;

impl Parser {
    /// Parse `git diff --name-status -M -z` output
    ///
    /// Tokens: `status NUL path NUL` and, for renames and copies,
    /// `status NUL old NUL new NUL`. Copies become additions of the new
    /// path; type changes are treated as modifications.
    pub fn parse_name_status(output: &str) -> Result<Vec<FileStatus>> {
        let mut tokens = output.trim_start_matches('\n').trim_end_matches('\0').split('\0');
        let mut files = Vec::new();

        while let Some(status) = tokens.next() {
            let Some(code) = status.chars().next() else {
                continue;
            };
            let mut path = || {
                tokens
                    .next()
                    .map(str::to_string)
                    .ok_or_else(|| Error::Parse(format!("missing path after status {:?}", status)))
            };

            let file = match code {
                'A' => FileStatus::Add { path: path()? },
                'M' | 'T' => FileStatus::Modify { path: path()? },
                'D' => FileStatus::Delete { path: path()? },
                'R' => {
                    let from = path()?;
                    let to = path()?;
                    FileStatus::Renamed { from, to }
                }
                'C' => {
                    let _source = path()?;
                    FileStatus::Add { path: path()? }
                }
                _ => {
                    return Err(Error::Parse(format!(
                        "unsupported file status {:?}",
                        status
                    )));
                }
            };
            files.push(file);
        }

        Ok(files)
    }

    /// Parse `git log -z --pretty=format:%H%x01%B`
    pub fn parse_checkin_log(output: &str) -> Result<Vec<PendingCommit>> {
        output
            .split('\0')
            .filter(|record| !record.trim().is_empty())
            .map(|record| {
                let (id, message) = record.split_once(CHECKIN_LOG_SEPARATOR).ok_or_else(|| {
                    Error::Parse(format!("log record without separator: {:?}", record))
                })?;
                Ok(PendingCommit {
                    id: id.trim().to_string(),
                    message: message.trim().to_string(),
                })
            })
            .collect()
    }

    /// Parse the first entry of `git ls-tree -z` output
    ///
    /// Format: `<mode> SP <type> SP <object> TAB <path> NUL`
    pub fn parse_tree_entry(output: &str) -> Option<TreeEntry> {
        let record = output.split('\0').next()?;
        let (meta, _path) = record.split_once('\t')?;
        let mut meta = meta.split(' ');
        let mode = meta.next()?.to_string();
        let _kind = meta.next()?;
        Some(TreeEntry {
            mode,
            id: meta.next()?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_status_all_kinds() {
        let output = "M\0src/a.c\0A\0src/new.c\0D\0old.c\0R087\0x.c\0y.c\0C100\0y.c\0z.c\0";
        let files = Parser::parse_name_status(output).unwrap();

        assert_eq!(
            files,
            vec![
                FileStatus::Modify { path: "src/a.c".into() },
                FileStatus::Add { path: "src/new.c".into() },
                FileStatus::Delete { path: "old.c".into() },
                FileStatus::Renamed {
                    from: "x.c".into(),
                    to: "y.c".into()
                },
                FileStatus::Add { path: "z.c".into() },
            ]
        );
    }

    #[test]
    fn test_parse_name_status_leading_newline_from_show() {
        let output = "\nM\0a.c\0";
        let files = Parser::parse_name_status(output).unwrap();
        assert_eq!(files, vec![FileStatus::Modify { path: "a.c".into() }]);
    }

    #[test]
    fn test_parse_name_status_keeps_trailing_spaces_in_paths() {
        let files = Parser::parse_name_status("A\0notes \0M\0 lead.txt\0").unwrap();
        assert_eq!(
            files,
            vec![
                FileStatus::Add { path: "notes ".into() },
                FileStatus::Modify { path: " lead.txt".into() },
            ]
        );
    }

    #[test]
    fn test_parse_name_status_empty() {
        assert!(Parser::parse_name_status("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_name_status_truncated_rename_is_error() {
        assert!(Parser::parse_name_status("R100\0only_old.c\0").is_err());
    }

    #[test]
    fn test_parse_name_status_unknown_code_is_error() {
        assert!(Parser::parse_name_status("U\0conflicted.c\0").is_err());
    }

    #[test]
    fn test_parse_checkin_log() {
        let output = "abc123\x01Fix bug\n\nDetails\n\0def456\x01Add feature\n";
        let commits = Parser::parse_checkin_log(output).unwrap();

        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].id, "abc123");
        assert_eq!(commits[0].message, "Fix bug\n\nDetails");
        assert_eq!(commits[1].id, "def456");
        assert_eq!(commits[1].message, "Add feature");
    }

    #[test]
    fn test_parse_checkin_log_empty() {
        assert!(Parser::parse_checkin_log("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_tree_entry() {
        let output = "120000 blob 1f2e3d4c5b6a\tlinks/current\0";
        let entry = Parser::parse_tree_entry(output).unwrap();
        assert_eq!(entry.mode, "120000");
        assert_eq!(entry.id, "1f2e3d4c5b6a");
        assert!(Parser::parse_tree_entry("120000 blob\tno/id").is_none());
        assert!(Parser::parse_tree_entry("").is_none());
    }
}
