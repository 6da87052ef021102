//! ClearCase to Git: fetch history, group it and replay it

use std::fs;
use std::path::PathBuf;

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info};

use super::Bridge;
use super::replay::{ReplayStrategy, Replayer};
use super::stash::with_stash;
use crate::cc::parser::Parser;
use crate::error::{Error, Result};
use crate::model::{ChangeGroup, group_changes};

/// Prefix of `%ai` that is parsed (`2024-01-29 15:30:00`)
const GIT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const GIT_DATE_LEN: usize = 19;

/// `lshistory -since` format (`29-Jan-2024.15:30:01`)
const SINCE_FORMAT: &str = "%d-%b-%Y.%H:%M:%S";

/// Flags of a rebase run
#[derive(Debug, Clone, Default)]
pub struct RebaseOptions {
    /// Stash local modifications around the replay
    pub stash: bool,
    /// Print the change groups instead of replaying them
    pub dry_run: bool,
    /// Print the raw history instead of replaying it
    pub print_history: bool,
    /// Replay a saved history file instead of querying ClearCase
    pub load: Option<PathBuf>,
}

/// What a rebase run did
#[derive(Debug)]
pub enum RebaseOutcome {
    /// Raw history, as requested by `print_history`
    History(String),
    /// Groups that would have been replayed
    DryRun(Vec<ChangeGroup>),
    /// No new history since the last synchronization
    UpToDate,
    Replayed { groups: usize, commits: usize },
}

impl Bridge {
    pub fn rebase(&self, options: &RebaseOptions) -> Result<RebaseOutcome> {
        self.cc().validate()?;
        if !(options.stash || options.dry_run || options.print_history) {
            self.check_pristine()?;
        }

        self.cc().update(".")?;
        let since = self.since()?;
        debug!(since = ?since, "history start");

        let history = match &options.load {
            Some(path) => fs::read_to_string(path)?,
            None => {
                self.cc().rebase_stream()?;
                let history = self.cc().history_raw(since.as_deref(), &self.config().include)?;
                let backup = self.workspace().history_backup_path();
                if let Some(parent) = backup.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(backup, &history)?;
                history
            }
        };
        if options.print_history {
            return Ok(RebaseOutcome::History(history));
        }

        let groups = self.read_groups(&history)?;
        if options.dry_run {
            return Ok(RebaseOutcome::DryRun(groups));
        }
        if groups.is_empty() {
            info!("nothing new in ClearCase");
            return Ok(RebaseOutcome::UpToDate);
        }

        let mut cache = self.open_cache()?;
        let strategy = ReplayStrategy::for_workspace(self.workspace());
        let commits = with_stash(self.git(), options.stash, || {
            Replayer::new(self, &mut cache).replay(strategy, &groups)
        })?;
        info!(groups = groups.len(), commits, "rebase complete");
        Ok(RebaseOutcome::Replayed {
            groups: groups.len(),
            commits,
        })
    }

    /// Parse raw history into change groups, oldest first, with full comments
    pub fn read_groups(&self, history: &str) -> Result<Vec<ChangeGroup>> {
        let mut records = Parser::parse_history(history, self.filter())?;
        records.reverse();

        let mut groups = group_changes(records);
        for group in &mut groups {
            group.resolve_comment(|comment| self.cc().real_comment(comment))?;
        }
        Ok(groups)
    }

    /// Fail when tracked files have uncommitted modifications
    fn check_pristine(&self) -> Result<()> {
        if self.git().modified_files()?.is_empty() {
            Ok(())
        } else {
            Err(Error::NotPristine)
        }
    }

    /// History start: just after the marker tag, or the configured date before the first sync
    fn since(&self) -> Result<Option<String>> {
        match self.git().author_date(self.workspace().ci_tag())? {
            Some(date) => history_since(&date).map(Some),
            None => Ok(self.config().since.clone()),
        }
    }
}

/// Convert a Git `%ai` date into the `lshistory -since` value one second later
pub fn history_since(git_date: &str) -> Result<String> {
    let date = git_date
        .trim()
        .get(..GIT_DATE_LEN)
        .ok_or_else(|| Error::Parse(format!("bad Git date {:?}", git_date)))?;
    let date = NaiveDateTime::parse_from_str(date, GIT_DATE_FORMAT)
        .map_err(|e| Error::Parse(format!("bad Git date {:?}: {}", git_date, e)))?;
    Ok((date + Duration::seconds(1)).format(SINCE_FORMAT).to_string())
}
