//! Branch and exclude filtering of ClearCase versions and paths

use glob::Pattern;

use crate::config::Config;
use crate::error::{Error, Result};

/// Compiled branch and exclude globs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchFilter {
    branches: Vec<Pattern>,
    extra_branches: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl BranchFilter {
    pub fn new(branches: &[String], extra_branches: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            branches: compile(branches)?,
            extra_branches: compile(extra_branches)?,
            exclude: compile(exclude)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.branches, &config.extra_branches, &config.exclude)
    }

    /// Does the branch of `version` match a configured branch pattern?
    ///
    /// `include_extra` also consults the extra branch list.
    /// Fails when the label has no branch component.
    pub fn matches(&self, version: &str, include_extra: bool) -> Result<bool> {
        let branch = branch_of(version)
            .ok_or_else(|| Error::Parse(format!("version label without a branch: {:?}", version)))?;

        let extra: &[Pattern] = if include_extra {
            &self.extra_branches
        } else {
            &[]
        };
        Ok(self
            .branches
            .iter()
            .chain(extra)
            .any(|p| p.matches(branch)))
    }

    /// Is `version` on the first configured branch?
    ///
    /// Versions merged back to the mainline replace whatever branch version
    /// was synchronized before them.
    pub fn on_mainline(&self, version: &str) -> bool {
        match (self.branches.first(), branch_of(version)) {
            (Some(pattern), Some(branch)) => pattern.matches(branch),
            _ => false,
        }
    }

    /// Is `path` covered by an exclude pattern?
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(path))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).map_err(|e| Error::Config(format!("bad pattern {:?}: {}", p, e))))
        .collect()
}

/// Branch component of a version label: the segment before the version number
///
/// `/main/dev/4` -> `dev`, `\main\3` -> `main`, `main/3` -> `main`
pub fn branch_of(version: &str) -> Option<&str> {
    let mut segments = version.rsplit(['/', '\\']);
    segments.next()?;
    segments.next()
}
