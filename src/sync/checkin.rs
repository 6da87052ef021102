//! Git to ClearCase: check in every commit made since the last synchronization

use std::fs;

use tracing::{debug, info};

use super::Bridge;
use super::transaction::Transaction;
use crate::cache::SyncCache;
use crate::error::Result;
use crate::git::constants::special;
use crate::git::parser::Parser as GitParser;
use crate::git::{GitExecutor, PendingCommit};
use crate::model::FileStatus;
use crate::workspace::Workspace;

/// Flags of a checkin run
#[derive(Debug, Clone, Default)]
pub struct CheckinOptions {
    /// Check in over elements modified in ClearCase since the last sync
    pub ignore_conflicts: bool,
    /// Label applied to every checked-out and created element
    pub label: Option<String>,
    /// Check in the whole history, without a marker tag and conflict checks
    pub initial: bool,
    /// Follow every parent instead of the first-parent chain
    pub all_parents: bool,
    /// Deliver the stream when done (UCM)
    pub deliver: bool,
}

impl Bridge {
    /// Check in the commits after the marker tag, oldest first
    ///
    /// Each commit is one transaction; the marker tag follows every commit
    /// that was checked in. Returns the number of commits checked in.
    pub fn checkin(&self, options: &CheckinOptions) -> Result<usize> {
        let git = self.git();
        let workspace = self.workspace();
        self.cc().validate()?;
        self.cc().update(".")?;

        let range = (!options.initial).then(|| format!("{}..", workspace.ci_tag()));
        let commits = GitParser::parse_checkin_log(&git.checkin_log_raw(range.as_deref(), options.all_parents)?)?;
        if commits.is_empty() {
            info!("nothing to check in");
            return Ok(0);
        }

        self.cc().rebase_stream()?;
        let mut cache = self.open_cache()?;
        for commit in &commits {
            let statuses = file_statuses(git, workspace, &commit.id, options.initial)?;
            if statuses.is_empty() {
                debug!("{} changes nothing in the view", commit.id);
            } else {
                self.check_in_commit(options, &mut cache, commit, &statuses)?;
            }
            git.force_tag(workspace.ci_tag(), &commit.id)?;
            info!(commit = %commit.id, files = statuses.len(), "checked in");
        }

        if options.deliver {
            self.cc().deliver()?;
        }
        if options.initial {
            git.commit_empty(special::EMPTY_COMMIT_MESSAGE)?;
            self.reset(special::HEAD)?;
        }
        Ok(commits.len())
    }

    fn check_in_commit(
        &self,
        options: &CheckinOptions,
        cache: &mut dyn SyncCache,
        commit: &PendingCommit,
        statuses: &[FileStatus],
    ) -> Result<()> {
        let mut tx = Transaction::open(self, options, &commit.id, &commit.message)?;

        let mut staged = Vec::with_capacity(statuses.len());
        for status in statuses {
            match status.stage(&mut tx) {
                Ok(file) => staged.push(file),
                Err(e) => {
                    tx.rollback();
                    return Err(e);
                }
            }
        }
        for file in &staged {
            if let Err(e) = file.commit(&mut tx) {
                tx.rollback();
                return Err(e);
            }
        }

        let checked_in = tx.commit()?;
        self.record_checkins(cache, statuses, &checked_in)
    }

    /// Remember the versions just created so the next rebase does not import them
    fn record_checkins(&self, cache: &mut dyn SyncCache, statuses: &[FileStatus], checked_in: &[String]) -> Result<()> {
        for path in checked_in {
            if self.workspace().cc_path(path).is_dir() {
                continue;
            }
            let version = self.cc().describe_version(path)?;
            cache.update(path, &version);
        }
        for status in statuses {
            match status {
                FileStatus::Delete { path } => cache.remove(path),
                FileStatus::Renamed { from, .. } => cache.remove(from),
                _ => {}
            }
        }
        cache.write()
    }
}

/// Changes commit `id` makes, relative to the view
///
/// `root` lists every file of the commit (initial check-in). Symbolic links
/// are detected from the tree entry mode; paths outside the workspace
/// sub-directory are dropped.
pub fn file_statuses(git: &GitExecutor, workspace: &Workspace, id: &str, root: bool) -> Result<Vec<FileStatus>> {
    let mut statuses = Vec::new();
    for status in GitParser::parse_name_status(&git.name_status_raw(id, root)?)? {
        for status in resolve_symlink(git, id, status)? {
            if let Some(status) = relative_to_view(workspace, status) {
                statuses.push(status);
            }
        }
    }
    Ok(statuses)
}

fn resolve_symlink(git: &GitExecutor, id: &str, status: FileStatus) -> Result<Vec<FileStatus>> {
    let path = match &status {
        FileStatus::Add { path } | FileStatus::Modify { path } => path.clone(),
        FileStatus::Renamed { to, .. } => to.clone(),
        _ => return Ok(vec![status]),
    };

    match git.tree_entry(id, &path)? {
        Some(entry) if entry.mode == special::SYMLINK_MODE => {
            let target = String::from_utf8_lossy(&git.blob_content(id, &path)?).into_owned();
            let link = FileStatus::SymLink { path, target };
            Ok(match status {
                FileStatus::Renamed { from, .. } => vec![FileStatus::Delete { path: from }, link],
                _ => vec![link],
            })
        }
        _ => Ok(vec![status]),
    }
}

/// Rewrite `status` relative to the view; a rename across the sub-directory
/// boundary becomes an addition or a deletion
fn relative_to_view(workspace: &Workspace, status: FileStatus) -> Option<FileStatus> {
    let strip = |p: &str| workspace.strip_subdir(p).map(str::to_string);
    match status {
        FileStatus::Renamed { from, to } => match (strip(&from), strip(&to)) {
            (Some(from), Some(to)) => Some(FileStatus::Renamed { from, to }),
            (None, Some(path)) => Some(FileStatus::Add { path }),
            (Some(path), None) => Some(FileStatus::Delete { path }),
            (None, None) => None,
        },
        other => {
            strip(other.path())?;
            Some(other.map_paths(|p| workspace.strip_subdir(p).unwrap_or(p).to_string()))
        }
    }
}

/// A file status whose elements are checked out, ready to be written
#[derive(Debug)]
pub struct StagedFile<'s> {
    status: &'s FileStatus,
    /// Directories to create, deepest first
    missing_dirs: Vec<String>,
    /// The view already has an element where a symbolic link goes
    replaces_element: bool,
}

impl FileStatus {
    /// Check out whatever reproducing this change will modify
    pub fn stage(&self, tx: &mut Transaction<'_>) -> Result<StagedFile<'_>> {
        let mut staged = StagedFile {
            status: self,
            missing_dirs: Vec::new(),
            replaces_element: false,
        };
        match self {
            FileStatus::Add { path } => staged.missing_dirs = stage_parents(tx, path)?,
            FileStatus::Modify { path } => tx.stage(path)?,
            FileStatus::Delete { path } => tx.stage_dir(parent(path))?,
            FileStatus::Renamed { from, to } => {
                tx.stage_dir(parent(from))?;
                tx.stage(from)?;
                staged.missing_dirs = stage_parents(tx, to)?;
            }
            FileStatus::SymLink { path, .. } => {
                let in_view = tx.bridge().workspace().cc_path(path);
                staged.replaces_element = in_view.symlink_metadata().is_ok();
                staged.missing_dirs = stage_parents(tx, path)?;
            }
        }
        Ok(staged)
    }
}

impl StagedFile<'_> {
    /// Reproduce the change in the view
    pub fn commit(&self, tx: &mut Transaction<'_>) -> Result<()> {
        let cc = tx.bridge().cc();
        match self.status {
            FileStatus::Add { path } => {
                self.create_missing_dirs(tx)?;
                write_blob(tx, path)?;
                cc.make_element(path)?;
                tx.label(path)?;
                tx.record(path);
            }
            FileStatus::Modify { path } => write_blob(tx, path)?,
            FileStatus::Delete { path } => cc.remove_name(path)?,
            FileStatus::Renamed { from, to } => {
                self.create_missing_dirs(tx)?;
                cc.move_element(from, to)?;
                tx.replace(from, to);
                write_blob(tx, to)?;
            }
            FileStatus::SymLink { path, target } => {
                self.create_missing_dirs(tx)?;
                if self.replaces_element {
                    cc.remove_name(path)?;
                }
                cc.make_symlink(target, path)?;
            }
        }
        Ok(())
    }

    fn create_missing_dirs(&self, tx: &mut Transaction<'_>) -> Result<()> {
        let bridge = tx.bridge();
        for dir in self.missing_dirs.iter().rev() {
            if bridge.workspace().cc_path(dir).exists() {
                continue;
            }
            bridge.cc().make_directory_element(dir)?;
            tx.label(dir)?;
            tx.record(dir);
        }
        Ok(())
    }
}

/// Check out the nearest existing ancestor of `path`; returns the missing ones
fn stage_parents(tx: &mut Transaction<'_>, path: &str) -> Result<Vec<String>> {
    let workspace = tx.bridge().workspace();
    let mut missing = Vec::new();
    let mut dir = parent(path);
    while !dir.is_empty() && !workspace.cc_path(dir).exists() {
        missing.push(dir.to_string());
        dir = parent(dir);
    }
    tx.stage_dir(dir)?;
    Ok(missing)
}

/// Write the content `path` has in the commit being checked in to the view
fn write_blob(tx: &Transaction<'_>, path: &str) -> Result<()> {
    let bridge = tx.bridge();
    let content = bridge
        .git()
        .blob_content(tx.source(), &bridge.workspace().git_relative(path))?;
    fs::write(bridge.workspace().cc_path(path), content)?;
    Ok(())
}

/// Parent directory of a `/`-separated path, empty at the root
fn parent(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}
