//! Git file status data model (write path)

/// A path changed by a Git commit, classified by what it takes to reproduce in ClearCase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// File was added (or copied)
    Add { path: String },

    /// File content changed
    Modify { path: String },

    /// File was deleted
    Delete { path: String },

    /// File was renamed, possibly with content changes
    Renamed { from: String, to: String },

    /// Entry is a symbolic link
    SymLink {
        path: String,
        /// Link target (the blob content)
        target: String,
    },
}

impl FileStatus {
    /// Path the entry has after the commit
    pub fn path(&self) -> &str {
        match self {
            Self::Add { path }
            | Self::Modify { path }
            | Self::Delete { path }
            | Self::SymLink { path, .. } => path,
            Self::Renamed { to, .. } => to,
        }
    }

    /// Rewrite every path of the entry
    pub fn map_paths(self, f: impl Fn(&str) -> String) -> Self {
        match self {
            Self::Add { path } => Self::Add { path: f(&path) },
            Self::Modify { path } => Self::Modify { path: f(&path) },
            Self::Delete { path } => Self::Delete { path: f(&path) },
            Self::Renamed { from, to } => Self::Renamed {
                from: f(&from),
                to: f(&to),
            },
            Self::SymLink { path, target } => Self::SymLink {
                path: f(&path),
                target,
            },
        }
    }
}
