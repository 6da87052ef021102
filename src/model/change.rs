//! ClearCase change record data model

/// Kind of a history entry the bridge knows how to replay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A checked-in file version, fetched as is
    Direct,

    /// A checked-in directory version, expanded into the file additions and
    /// removals it implies
    Uncataloged,
}

impl ChangeKind {
    /// `%o%m` tag of a checked-in file version
    pub const DIRECT_TAG: &'static str = "checkinversion";

    /// `%o%m` tag of a checked-in directory version
    pub const UNCATALOGED_TAG: &'static str = "checkindirectory version";

    /// Kind for an `lshistory` operation tag, `None` for operations that are not replayed
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            Self::DIRECT_TAG => Some(Self::Direct),
            Self::UNCATALOGED_TAG => Some(Self::Uncataloged),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Direct => Self::DIRECT_TAG,
            Self::Uncataloged => Self::UNCATALOGED_TAG,
        }
    }
}

/// One parsed entry of the ClearCase history stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub kind: ChangeKind,

    /// `%Nd` timestamp (`YYYYMMDD.HHMMSS`)
    pub date: String,

    /// ClearCase login of the author
    pub user: String,

    /// Element path relative to the view
    pub file: String,

    /// Version label, e.g. `/main/dev/4`
    pub version: String,

    /// Full comment, possibly multi-line
    pub comment: String,
}

impl ChangeRecord {
    /// First line of the comment
    pub fn subject(&self) -> &str {
        subject_of(&self.comment)
    }

    /// `file@@version` extended path naming this exact version
    pub fn extended_path(&self) -> String {
        extended_path(&self.file, &self.version)
    }
}

pub fn subject_of(comment: &str) -> &str {
    comment.split('\n').next().unwrap_or_default()
}

pub fn extended_path(file: &str, version: &str) -> String {
    format!("{}@@{}", file, version)
}
