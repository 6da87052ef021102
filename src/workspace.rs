//! Paths and reference names of one synchronization target

use std::path::PathBuf;

/// Name of the tag marking the last commit synchronized with ClearCase
pub const CI_TAG: &str = "clearcase_ci";

/// Name of the branch history is replayed onto
pub const CC_TAG: &str = "clearcase";

/// Raw history snapshot kept for offline replay
pub const HISTORY_BACKUP_FILE: &str = "lshistory.bak";

/// The Git work tree, the ClearCase view and an optional Git sub-directory they map onto
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    git_dir: PathBuf,
    cc_dir: PathBuf,
    subdir: Option<String>,
    ci_tag: String,
    cc_tag: String,
}

impl Workspace {
    pub fn new(git_dir: impl Into<PathBuf>, cc_dir: impl Into<PathBuf>) -> Self {
        Self {
            git_dir: git_dir.into(),
            cc_dir: cc_dir.into(),
            subdir: None,
            ci_tag: CI_TAG.to_string(),
            cc_tag: CC_TAG.to_string(),
        }
    }

    /// Map the view onto `subdir` of the work tree
    ///
    /// Each sub-directory gets its own marker tag and replay branch.
    pub fn with_subdir(mut self, subdir: Option<&str>) -> Self {
        let subdir = subdir
            .map(|s| s.trim_matches('/').to_string())
            .filter(|s| !s.is_empty() && s != ".");
        if let Some(ref dir) = subdir {
            let suffix = dir.replace('/', "_");
            self.ci_tag = format!("{}_{}", CI_TAG, suffix);
            self.cc_tag = format!("{}_{}", CC_TAG, suffix);
        }
        self.subdir = subdir;
        self
    }

    pub fn subdir(&self) -> Option<&str> {
        self.subdir.as_deref()
    }

    pub fn ci_tag(&self) -> &str {
        &self.ci_tag
    }

    pub fn cc_tag(&self) -> &str {
        &self.cc_tag
    }

    /// Path of a ClearCase-relative file inside the Git repository, relative to its root
    pub fn git_relative(&self, file: &str) -> String {
        let file = normalize(file);
        match &self.subdir {
            Some(dir) => format!("{}/{}", dir, file),
            None => file,
        }
    }

    /// Absolute path of a ClearCase-relative file inside the Git work tree
    pub fn git_path(&self, file: &str) -> PathBuf {
        self.git_dir.join(self.git_relative(file))
    }

    /// Absolute path of a ClearCase-relative file inside the view
    pub fn cc_path(&self, file: &str) -> PathBuf {
        self.cc_dir.join(normalize(file))
    }

    /// ClearCase-relative path of a Git path, `None` when outside the sub-directory
    pub fn strip_subdir<'a>(&self, git_path: &'a str) -> Option<&'a str> {
        match &self.subdir {
            Some(dir) => git_path
                .strip_prefix(dir.as_str())
                .and_then(|rest| rest.strip_prefix('/')),
            None => Some(git_path),
        }
    }

    pub fn history_backup_path(&self) -> PathBuf {
        self.git_dir.join(".git").join(HISTORY_BACKUP_FILE)
    }

    pub fn cache_path(&self) -> PathBuf {
        let name = match &self.subdir {
            Some(dir) => format!("gitcc_{}.cache", dir.replace('/', "_")),
            None => "gitcc.cache".to_string(),
        };
        self.git_dir.join(".git").join(name)
    }
}

/// Use `/` separators and drop a leading `./`
pub fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    match path.strip_prefix("./") {
        Some(rest) => rest.to_string(),
        None => path,
    }
}
