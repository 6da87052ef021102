//! cleartool-specific constants
//!
//! Centralized definitions for cleartool command names, flags and output formats.

/// cleartool binary name
pub const CLEARTOOL_COMMAND: &str = "cleartool";

/// cleartool subcommands
pub mod commands {
    pub const LSHISTORY: &str = "lsh";
    pub const GET: &str = "get";
    pub const DIFF: &str = "diff";
    pub const DESCRIBE: &str = "describe";
    pub const LS: &str = "ls";
    pub const UPDATE: &str = "update";
    pub const CHECKOUT: &str = "co";
    pub const UNCHECKOUT: &str = "unco";
    pub const CHECKIN: &str = "ci";
    pub const MKLABEL: &str = "mklabel";
    pub const MKELEM: &str = "mkelem";
    pub const RMNAME: &str = "rm";
    pub const MOVE: &str = "mv";
    pub const LINK: &str = "ln";
    pub const REBASE: &str = "rebase";
    pub const MKACT: &str = "mkact";
    pub const SETACT: &str = "setact";
    pub const RMACT: &str = "rmactivity";
    pub const LSACT: &str = "lsactivity";
    pub const DELIVER: &str = "deliver";
}

/// cleartool flags
pub mod flags {
    pub const FORMAT: &str = "-fmt";
    pub const RECURSE: &str = "-recurse";
    pub const SINCE: &str = "-since";
    pub const TO: &str = "-to";
    pub const SHORT: &str = "-short";
    pub const DIFF_FORMAT: &str = "-diff_format";
    pub const PREDECESSOR: &str = "-pred";
    pub const RESERVED: &str = "-reserved";
    /// No comment
    pub const NC: &str = "-nc";
    pub const COMMENT: &str = "-c";
    pub const REMOVE: &str = "-rm";
    pub const REPLACE: &str = "-replace";
    pub const IDENTICAL: &str = "-identical";
    pub const ELEMENT_TYPE: &str = "-eltype";
    pub const DIRECTORY: &str = "directory";
    pub const SYMBOLIC: &str = "-s";
    pub const FORCE: &str = "-f";
    pub const HEADLINE: &str = "-headline";
    pub const NONE: &str = "-none";
    pub const COMPLETE: &str = "-complete";
    pub const RECOMMENDED: &str = "-rec";
    pub const COMPLETE_SHORT: &str = "-com";
}

/// `-fmt` strings and the delimiters they produce
pub mod formats {
    /// Field delimiter of history output
    pub const DELIM: char = '|';

    /// History record fields before the comment: operation+kind, date, user, element, version
    pub const HISTORY_PREFIX: &str = "%o%m|%Nd|%u|%En|%Vn|";

    /// History fields of a single element: operation+kind, date, version
    pub const ELEMENT_HISTORY: &str = "%o%m|%Nd|%Vn\\n";

    /// Comment of a version (base ClearCase)
    pub const COMMENT: &str = "%Nc";

    /// Activity of a version (UCM)
    pub const ACTIVITY: &str = "%[activity]p";

    pub const DATE: &str = "%Nd";

    pub const VERSION: &str = "%Vn";

    pub const HEADLINE: &str = "%[headline]p";

    /// Separator between activity records of `lsactivity`
    pub const ACTIVITY_SEPARATOR: &str = "@@@";

    /// `lsactivity` record: headline and activity name
    pub const ACTIVITY_LIST: &str = "%[headline]p|%n@@@";

    /// Record terminator, escaped for cleartool to expand
    pub const NEWLINE: &str = "\\n";
}

/// Patterns recognized in cleartool output
pub mod patterns {
    /// `cleartool rebase` output when the stream is up to date
    pub const NO_REBASE_NEEDED: &str = "No rebase needed";

    /// Rename marker in directory diffs (symbolic links)
    pub const LINK_ARROW: &str = " -> ";
}
