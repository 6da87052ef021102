//! User configuration
//!
//! Read from `<repo>/.git/gitcc.toml`:
//!
//! ```toml
//! clearcase = "/view/me_dev/vobs/project"
//! branches = ["main", "dev*"]
//! extra_branches = ["integration"]
//! include = ["."]
//! exclude = ["*.class", "build/*"]
//! since = "01-Jan-2020"
//! mode = "ucm"
//! mail_suffix = "example.com"
//!
//! [users]
//! jdoe = "John Doe <john.doe@example.com>"
//! asmith = "Alice Smith"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cc::CcMode;
use crate::error::{Error, Result};

/// Config file name inside the `.git` directory
pub const CONFIG_FILE: &str = "gitcc.toml";

/// Settings shared by rebase and checkin
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root of the ClearCase view the repository mirrors
    pub clearcase: PathBuf,

    /// Glob patterns of branches whose versions are imported
    #[serde(default = "default_branches")]
    pub branches: Vec<String>,

    /// Additional branches considered when expanding directory versions
    #[serde(default)]
    pub extra_branches: Vec<String>,

    /// Paths (relative to the view) passed to history queries
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Glob patterns of files never fetched from ClearCase
    #[serde(default)]
    pub exclude: Vec<String>,

    /// History start (`dd-Mon-yyyy[.HH:MM:SS]`) used before the first sync
    #[serde(default)]
    pub since: Option<String>,

    #[serde(default)]
    pub mode: CcMode,

    /// Domain used to synthesize e-mail addresses for unmapped users
    #[serde(default = "default_mail_suffix")]
    pub mail_suffix: String,

    /// Fetch failures for paths at least this long are logged instead of fatal
    ///
    /// Some cleartool builds fail `get` on very long element paths.
    #[serde(default)]
    pub fetch_failure_path_threshold: Option<usize>,

    /// ClearCase login -> `Name <email>` or `Name`
    #[serde(default)]
    pub users: BTreeMap<String, String>,
}

fn default_branches() -> Vec<String> {
    vec!["main".to_string()]
}

fn default_include() -> Vec<String> {
    vec![".".to_string()]
}

fn default_mail_suffix() -> String {
    "localhost".to_string()
}

impl Config {
    /// Default location of the config file for a Git work tree
    pub fn default_path(git_dir: &Path) -> PathBuf {
        git_dir.join(".git").join(CONFIG_FILE)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        if config.branches.is_empty() {
            return Err(Error::Config("`branches` must list at least one pattern".to_string()));
        }
        Ok(config)
    }

    /// A config with defaults for everything but the view directory
    pub fn with_view(clearcase: impl Into<PathBuf>) -> Self {
        Self {
            clearcase: clearcase.into(),
            branches: default_branches(),
            extra_branches: Vec::new(),
            include: default_include(),
            exclude: Vec::new(),
            since: None,
            mode: CcMode::default(),
            mail_suffix: default_mail_suffix(),
            fetch_failure_path_threshold: None,
            users: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = Config::parse(r#"clearcase = "/view/vob""#).unwrap();

        assert_eq!(config.clearcase, PathBuf::from("/view/vob"));
        assert_eq!(config.branches, vec!["main"]);
        assert_eq!(config.include, vec!["."]);
        assert!(config.exclude.is_empty());
        assert_eq!(config.mode, CcMode::Base);
        assert_eq!(config.fetch_failure_path_threshold, None);
        assert_eq!(config, Config::with_view("/view/vob"));
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            clearcase = "/view/vob"
            branches = ["main", "dev*"]
            extra_branches = ["integration"]
            exclude = ["*.class"]
            since = "01-Jan-2020"
            mode = "ucm"
            mail_suffix = "example.com"
            fetch_failure_path_threshold = 200

            [users]
            jdoe = "John Doe <john@example.com>"
            "#,
        )
        .unwrap();

        assert_eq!(config.branches, vec!["main", "dev*"]);
        assert_eq!(config.extra_branches, vec!["integration"]);
        assert_eq!(config.mode, CcMode::Ucm);
        assert_eq!(config.since.as_deref(), Some("01-Jan-2020"));
        assert_eq!(config.fetch_failure_path_threshold, Some(200));
        assert_eq!(
            config.users.get("jdoe").map(String::as_str),
            Some("John Doe <john@example.com>")
        );
    }

    #[test]
    fn test_parse_rejects_missing_view() {
        let err = Config::parse(r#"branches = ["main"]"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_parse_rejects_empty_branch_list() {
        let err = Config::parse("clearcase = \"/v\"\nbranches = []").unwrap_err();
        assert!(err.to_string().contains("branches"));
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        assert!(Config::parse("clearcase = \"/v\"\nmode = \"svn\"").is_err());
    }
}
