//! git-specific constants
//!
//! Centralized definitions for git command names, flags and special values.

/// git command binary name
pub const GIT_COMMAND: &str = "git";

/// git subcommands
pub mod commands {
    pub const ADD: &str = "add";
    pub const BRANCH: &str = "branch";
    pub const CAT_FILE: &str = "cat-file";
    pub const CHECKOUT: &str = "checkout";
    pub const COMMIT: &str = "commit";
    pub const DIFF: &str = "diff";
    pub const HASH_OBJECT: &str = "hash-object";
    pub const LOG: &str = "log";
    pub const LS_FILES: &str = "ls-files";
    pub const LS_TREE: &str = "ls-tree";
    pub const MERGE: &str = "merge";
    pub const MERGE_BASE: &str = "merge-base";
    pub const REBASE: &str = "rebase";
    pub const RM: &str = "rm";
    pub const SHOW: &str = "show";
    pub const STASH: &str = "stash";
    pub const STASH_POP: &str = "pop";
    pub const SYMBOLIC_REF: &str = "symbolic-ref";
    pub const TAG: &str = "tag";
}

/// git command flags
pub mod flags {
    pub const FORCE: &str = "-f";
    pub const RECURSIVE: &str = "-r";
    pub const MESSAGE: &str = "-m";
    pub const ALLOW_EMPTY: &str = "--allow-empty";
    pub const NUL_TERMINATED: &str = "-z";
    pub const NAME_STATUS: &str = "--name-status";
    pub const FIND_RENAMES: &str = "-M";
    pub const IGNORE_SUBMODULES: &str = "--ignore-submodules";
    pub const REVERSE: &str = "--reverse";
    pub const FIRST_PARENT: &str = "--first-parent";
    pub const MODIFIED: &str = "--modified";
    pub const QUIET: &str = "-q";
    pub const SHORT: &str = "--short";
    pub const MAX_COUNT_ONE: &str = "-n1";
    pub const BLOB: &str = "blob";
    pub const END_OF_OPTIONS: &str = "--";
}

/// `--pretty` formats
pub mod formats {
    /// Commit id and raw body separated by `\x01`
    pub const CHECKIN_LOG: &str = "--pretty=format:%H%x01%B";

    /// Separator emitted by `%x01`
    pub const CHECKIN_LOG_SEPARATOR: char = '\x01';

    /// Author date, ISO-like (`2024-01-29 15:30:00 +0900`)
    pub const AUTHOR_DATE: &str = "--pretty=format:%ai";

    /// Empty header so `show` only prints the file list
    pub const EMPTY: &str = "--pretty=format:";
}

/// Special git values
pub mod special {
    pub const HEAD: &str = "HEAD";

    /// Tree entry mode of a symbolic link
    pub const SYMLINK_MODE: &str = "120000";

    /// Message of the commit that closes an initial checkin
    pub const EMPTY_COMMIT_MESSAGE: &str = "Empty commit";

    /// Placeholder for change groups without a comment
    pub const EMPTY_MESSAGE: &str = "<empty message>";
}

/// Error detection patterns in git output
pub mod errors {
    /// `git commit` refusing an empty change
    pub const NOTHING_TO_COMMIT: &str = r"nothing( added)? to commit";

    /// `git stash` with a clean work tree
    pub const NO_LOCAL_CHANGES: &str = "No local changes to save";
}
