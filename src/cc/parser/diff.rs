//! Directory diff parser (cleartool diff -diff_format -pred)

use super::super::constants::patterns::LINK_ARROW;

use super::Parser;

/// An entry that appeared in or disappeared from a directory version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEntry {
    Added(String),
    Removed(String),
}

impl Parser {
    /// Parse a directory diff against the predecessor version
    ///
    /// Format (after the header block):
    /// - `< name  --date user` (removed)
    /// - `> name  --date user` (added)
    /// - `> sub/  --date user` (added directory, trailing `/` dropped)
    ///
    /// Symbolic link lines (`name -> target`) are skipped.
    pub fn parse_directory_diff(output: &str) -> Vec<DirectoryEntry> {
        output
            .lines()
            .filter(|line| !line.contains(LINK_ARROW))
            .filter(|line| !line.starts_with("<<<") && !line.starts_with(">>>"))
            .filter_map(|line| {
                let name = Self::entry_name(line)?.to_string();
                match line.as_bytes().first() {
                    Some(b'<') => Some(DirectoryEntry::Removed(name)),
                    Some(b'>') => Some(DirectoryEntry::Added(name)),
                    _ => None,
                }
            })
            .collect()
    }

    /// Entry name: text after the marker up to the column gap (or `/ ` of directories)
    fn entry_name(line: &str) -> Option<&str> {
        let rest = line.get(2..)?;
        let end = [rest.find("  "), rest.find("/ ")]
            .into_iter()
            .flatten()
            .max()
            .unwrap_or(rest.len());
        let name = rest[..end].trim_end().trim_end_matches('/');
        (!name.is_empty()).then_some(name)
    }
}
