//! Replay of ClearCase change groups as Git commits

use std::fs;
use std::io;
use std::path::Path;

use scopeguard::ScopeGuard;
use tracing::{debug, error, info, warn};

use super::Bridge;
use crate::cache::SyncCache;
use crate::cc::parser::{DirectoryEntry, Parser};
use crate::error::Result;
use crate::git::GitExecutor;
use crate::git::constants::special;
use crate::model::{ChangeGroup, ChangeKind, ChangeRecord, Identity, extended_path};
use crate::workspace::{Workspace, normalize};

/// How replayed commits are brought onto the user's branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayStrategy {
    /// Commit on the replay branch, then rebase the user's branch onto it
    Direct,
    /// Commit on the replay branch after merging the user's branch into it,
    /// then merge the result back (sub-directory mode)
    Merge,
}

impl ReplayStrategy {
    pub fn for_workspace(workspace: &Workspace) -> Self {
        if workspace.subdir().is_some() {
            Self::Merge
        } else {
            Self::Direct
        }
    }

    fn prepare(self, git: &GitExecutor, workspace: &Workspace, branch: &str) -> Result<()> {
        git.checkout(workspace.cc_tag())?;
        if self == Self::Merge {
            git.merge(branch)?;
        }
        Ok(())
    }

    fn finish(self, git: &GitExecutor, workspace: &Workspace, branch: &str) -> Result<()> {
        match self {
            Self::Direct => {
                git.rebase(workspace.ci_tag(), workspace.cc_tag())?;
                git.rebase(workspace.cc_tag(), branch)
            }
            Self::Merge => {
                git.checkout(branch)?;
                git.merge(workspace.cc_tag())
            }
        }
    }
}

/// Bring the replayed commits onto `branch` (or the replay branch onto a
/// detached HEAD), then move the marker tag to the replay branch
fn conclude(
    strategy: ReplayStrategy,
    git: &GitExecutor,
    workspace: &Workspace,
    branch: Option<&str>,
) -> Result<()> {
    match branch {
        Some(branch) => strategy.finish(git, workspace, branch)?,
        None => git.force_branch(workspace.cc_tag(), None)?,
    }
    git.force_tag(workspace.ci_tag(), workspace.cc_tag())
}

/// Applies change groups to the Git work tree, one commit per group
pub struct Replayer<'a> {
    bridge: &'a Bridge,
    cache: &'a mut dyn SyncCache,
}

impl<'a> Replayer<'a> {
    pub fn new(bridge: &'a Bridge, cache: &'a mut dyn SyncCache) -> Self {
        Self { bridge, cache }
    }

    /// Replay `groups` in order and return the number of commits created
    ///
    /// The branch bookkeeping of `strategy` is concluded on every exit path.
    /// When a commit fails, a conclusion error is only logged and the commit
    /// error is returned.
    pub fn replay(&mut self, strategy: ReplayStrategy, groups: &[ChangeGroup]) -> Result<usize> {
        let bridge = self.bridge;
        let git = bridge.git();
        let workspace = bridge.workspace();

        let branch = git.current_branch()?;
        match &branch {
            Some(branch) => strategy.prepare(git, workspace, branch)?,
            None => debug!("detached HEAD, replaying in place"),
        }

        let guard = scopeguard::guard(branch, |branch| {
            if let Err(e) = conclude(strategy, git, workspace, branch.as_deref()) {
                error!("failed to restore branches after an aborted replay: {}", e);
            }
        });

        let mut commits = 0;
        for group in groups {
            if self.commit_group(group)? {
                commits += 1;
            }
        }

        let branch = ScopeGuard::into_inner(guard);
        conclude(strategy, git, workspace, branch.as_deref())?;
        Ok(commits)
    }

    /// Materialize every member of `group`, then commit them as its author
    ///
    /// Returns false when the group produced no change in Git.
    pub fn commit_group(&mut self, group: &ChangeGroup) -> Result<bool> {
        let members: Vec<String> = group.files.iter().map(|f| normalize(&f.file)).collect();
        for record in &group.files {
            self.add(record, &members)?;
        }
        self.cache.write()?;

        let config = self.bridge.config();
        let identity = Identity::resolve(&group.user, &group.date, &config.users, &config.mail_suffix)?;
        let message = if group.comment.trim().is_empty() {
            special::EMPTY_MESSAGE
        } else {
            group.comment.as_str()
        };
        let committed = self.bridge.git().commit(message, &identity.env())?;
        if committed {
            info!(author = %identity.name, files = group.files.len(), "{}", group.subject);
        }
        Ok(committed)
    }

    /// Materialize one record; `members` are the paths of its group
    pub fn add(&mut self, record: &ChangeRecord, members: &[String]) -> Result<()> {
        match record.kind {
            ChangeKind::Direct => self.fetch(&record.file, &record.version),
            ChangeKind::Uncataloged => self.expand_directory(record, members),
        }
    }

    /// Copy `file@@version` into the work tree and stage it
    fn fetch(&mut self, file: &str, version: &str) -> Result<()> {
        if !self.cache.update(file, version) {
            debug!("{}@@{} already synchronized", file, version);
            return Ok(());
        }
        let bridge = self.bridge;
        if bridge.filter().is_excluded(&normalize(file)) {
            debug!("{} is excluded", file);
            return Ok(());
        }

        let git = bridge.git();
        let dest = bridge.workspace().git_path(file);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        remove_if_present(&dest)?;

        if let Err(e) = bridge.cc().get(&dest, &extended_path(file, version)) {
            match bridge.config().fetch_failure_path_threshold {
                Some(limit) if file.len() >= limit => {
                    warn!("could not fetch {}@@{} (path length {}): {}", file, version, file.len(), e);
                }
                _ => return Err(e),
            }
        }

        if dest.exists() {
            make_writable(&dest)?;
        } else {
            git.checkout_file(special::HEAD, &dest)?;
        }
        git.add_force(&dest)
    }

    /// Reproduce the entries a directory version added or removed
    fn expand_directory(&mut self, record: &ChangeRecord, members: &[String]) -> Result<()> {
        let bridge = self.bridge;
        let cc = bridge.cc();
        let workspace = bridge.workspace();
        let directory = record.extended_path();
        let diff = cc.directory_diff_raw(&directory)?;

        let mut directory_date: Option<String> = None;
        for entry in Parser::parse_directory_diff(&diff) {
            match entry {
                DirectoryEntry::Removed(name) => {
                    let file = join(&record.file, &name);
                    bridge.git().remove_recursive(&workspace.git_relative(&file))?;
                    self.cache.remove(&file);
                }
                DirectoryEntry::Added(name) => {
                    let file = join(&record.file, &name);
                    let in_view = workspace.cc_path(&file);
                    if !in_view.exists() || in_view.is_dir() || members.contains(&file) {
                        continue;
                    }

                    let history = cc.element_history_raw(&file)?;
                    if history.trim().is_empty() {
                        continue;
                    }
                    let date = match &directory_date {
                        Some(date) => date.clone(),
                        None => {
                            let date = cc.describe_date(&directory)?;
                            directory_date = Some(date.clone());
                            date
                        }
                    };

                    let mut chosen = None;
                    for version in Parser::parse_element_history(&history) {
                        if version.date < date
                            && version.is_checkin()
                            && bridge.filter().matches(&version.version, true)?
                        {
                            chosen = Some(version.version);
                            break;
                        }
                    }

                    match chosen {
                        Some(version) => self.fetch(&file, &version)?,
                        None => warn!(
                            "It appears that you may be missing a branch in the includes section of your gitcc config for file '{}'.",
                            file
                        ),
                    }
                }
            }
        }
        Ok(())
    }
}

/// Path of `name` inside the element directory `dir`
fn join(dir: &str, name: &str) -> String {
    match normalize(dir).as_str() {
        "" | "." => normalize(name),
        dir => format!("{}/{}", dir, normalize(name)),
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

/// `cleartool get` leaves files read-only
fn make_writable(path: &Path) -> Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        permissions.set_mode(permissions.mode() | 0o200);
    }
    #[cfg(not(unix))]
    permissions.set_readonly(false);
    fs::set_permissions(path, permissions)?;
    Ok(())
}
