//! Synchronization between the Git work tree and the ClearCase view
//!
//! [`Bridge`] owns both executors and the configuration. Each direction is
//! implemented in its own module:
//! - [`rebase`](Bridge::rebase): ClearCase history replayed as Git commits
//! - [`checkin`](Bridge::checkin): Git commits checked in to ClearCase
//! - [`reset`](Bridge::reset): move the synchronization markers

mod checkin;
mod rebase;
mod replay;
mod reset;
mod stash;
mod transaction;

use std::path::PathBuf;
use std::rc::Rc;

use tracing::info;

use crate::branch::BranchFilter;
use crate::cache::FileCache;
use crate::cc::CcExecutor;
use crate::config::Config;
use crate::error::Result;
use crate::exec::{CommandRunner, ProcessRunner};
use crate::git::GitExecutor;
use crate::workspace::Workspace;

pub use checkin::{CheckinOptions, StagedFile, file_statuses};
pub use rebase::{RebaseOptions, RebaseOutcome, history_since};
pub use replay::{ReplayStrategy, Replayer};
pub use stash::with_stash;
pub use transaction::Transaction;

/// Everything one synchronization run needs
pub struct Bridge {
    git: GitExecutor,
    cc: CcExecutor,
    workspace: Workspace,
    config: Config,
    filter: BranchFilter,
}

impl Bridge {
    /// Bridge running real `git` and `cleartool` processes
    pub fn new(config: Config, git_dir: impl Into<PathBuf>, subdir: Option<&str>) -> Result<Self> {
        Self::with_runner(Rc::new(ProcessRunner), config, git_dir, subdir)
    }

    pub fn with_runner(
        runner: Rc<dyn CommandRunner>,
        config: Config,
        git_dir: impl Into<PathBuf>,
        subdir: Option<&str>,
    ) -> Result<Self> {
        let git_dir = git_dir.into();
        let filter = BranchFilter::from_config(&config)?;
        let workspace = Workspace::new(&git_dir, &config.clearcase).with_subdir(subdir);
        Ok(Self {
            git: GitExecutor::with_runner(runner.clone(), git_dir),
            cc: CcExecutor::with_runner(runner, &config.clearcase, config.mode),
            workspace,
            config,
            filter,
        })
    }

    pub fn git(&self) -> &GitExecutor {
        &self.git
    }

    pub fn cc(&self) -> &CcExecutor {
        &self.cc
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn filter(&self) -> &BranchFilter {
        &self.filter
    }

    /// Load the synchronization cache, seeding it from the view on first use
    pub fn open_cache(&self) -> Result<FileCache> {
        let path = self.workspace.cache_path();
        if let Some(cache) = FileCache::load(&path)? {
            return Ok(cache.with_mainline(self.filter.clone()));
        }

        let mut cache = FileCache::new(path).with_mainline(self.filter.clone());
        cache.seed(&self.cc.list_versions_raw(&self.config.include)?);
        info!(entries = cache.len(), "seeded cache from the view");
        Ok(cache)
    }
}
