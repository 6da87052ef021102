//! git command executor
//!
//! Handles running git commands in the work tree and capturing their output.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use super::constants::{self, commands, errors, flags, formats, special};
use super::parser::{Parser, TreeEntry};
use crate::error::{Error, Result};
use crate::exec::{self, CommandOutput, CommandRunner, Invocation, ProcessRunner};

static NOTHING_TO_COMMIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(errors::NOTHING_TO_COMMIT).expect("Invalid nothing-to-commit regex"));

/// Executor for git commands
#[derive(Clone)]
pub struct GitExecutor {
    runner: Rc<dyn CommandRunner>,
    /// Root of the work tree every command runs in
    repo_path: PathBuf,
}

impl GitExecutor {
    /// Create an executor running real git processes
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self::with_runner(Rc::new(ProcessRunner), repo_path)
    }

    pub fn with_runner(runner: Rc<dyn CommandRunner>, repo_path: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            repo_path: repo_path.into(),
        }
    }

    /// Run a git command with the given arguments
    pub fn run(&self, args: &[&str]) -> Result<String> {
        self.run_output(args, &[]).map(|o| o.stdout_text())
    }

    /// Run a git command whose failure is expected to be benign
    pub fn run_lenient(&self, args: &[&str]) -> Result<String> {
        let args = exec::owned_args(args);
        exec::execute_lenient(self.runner.as_ref(), &self.invocation(&args, &[]))
    }

    fn run_output(&self, args: &[&str], env: &[(String, String)]) -> Result<CommandOutput> {
        let args = exec::owned_args(args);
        exec::execute(self.runner.as_ref(), &self.invocation(&args, env))
    }

    fn invocation<'a>(&'a self, args: &'a [String], env: &'a [(String, String)]) -> Invocation<'a> {
        Invocation {
            program: constants::GIT_COMMAND,
            args,
            cwd: &self.repo_path,
            env,
        }
    }

    // ── References ────────────────────────────────────────────────────

    /// Name of the checked-out branch, `None` on a detached HEAD
    pub fn current_branch(&self) -> Result<Option<String>> {
        match self.run(&[commands::SYMBOLIC_REF, flags::SHORT, flags::QUIET, special::HEAD]) {
            Ok(out) => Ok(Some(out.trim().to_string()).filter(|b| !b.is_empty())),
            Err(Error::CommandFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn checkout(&self, rev: &str) -> Result<()> {
        self.run(&[commands::CHECKOUT, rev]).map(drop)
    }

    /// Fast-forward (when possible) merge of `rev` into the current branch
    pub fn merge(&self, rev: &str) -> Result<()> {
        self.run(&[commands::MERGE, rev]).map(drop)
    }

    /// Rebase `branch` onto `upstream`
    pub fn rebase(&self, upstream: &str, branch: &str) -> Result<()> {
        self.run(&[commands::REBASE, upstream, branch]).map(drop)
    }

    /// Point `branch` at `rev` (HEAD when `None`), creating it if needed
    pub fn force_branch(&self, branch: &str, rev: Option<&str>) -> Result<()> {
        let mut args = vec![commands::BRANCH, flags::FORCE, branch];
        args.extend(rev);
        self.run(&args).map(drop)
    }

    /// Point tag `name` at `rev`, creating it if needed
    pub fn force_tag(&self, name: &str, rev: &str) -> Result<()> {
        self.run(&[commands::TAG, flags::FORCE, name, rev]).map(drop)
    }

    /// Author date of `rev` (`%ai`), `None` when the revision does not exist
    pub fn author_date(&self, rev: &str) -> Result<Option<String>> {
        match self.run(&[commands::LOG, flags::MAX_COUNT_ONE, formats::AUTHOR_DATE, rev]) {
            Ok(out) => Ok(Some(out.trim().to_string()).filter(|d| !d.is_empty())),
            Err(Error::CommandFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn merge_base(&self, a: &str, b: &str) -> Result<String> {
        Ok(self.run(&[commands::MERGE_BASE, a, b])?.trim().to_string())
    }

    // ── Work tree ─────────────────────────────────────────────────────

    /// Tracked files with unstaged modifications
    pub fn modified_files(&self) -> Result<Vec<String>> {
        Ok(self
            .run(&[commands::LS_FILES, flags::MODIFIED])?
            .lines()
            .map(str::to_string)
            .collect())
    }

    /// Stage `path`, even when ignored
    pub fn add_force(&self, path: &Path) -> Result<()> {
        let path = path.to_string_lossy().into_owned();
        self.run_lenient(&[commands::ADD, flags::FORCE, path.as_str()]).map(drop)
    }

    /// Remove `path` from index and work tree, tolerating paths git does not track
    pub fn remove_recursive(&self, path: &str) -> Result<()> {
        self.run_lenient(&[commands::RM, flags::RECURSIVE, path]).map(drop)
    }

    /// Restore `path` from `rev`
    pub fn checkout_file(&self, rev: &str, path: &Path) -> Result<()> {
        let path = path.to_string_lossy().into_owned();
        self.run(&[commands::CHECKOUT, rev, flags::END_OF_OPTIONS, path.as_str()])
            .map(drop)
    }

    /// Commit the index, `env` carrying the author and committer identity
    ///
    /// Returns false when git reports there was nothing to commit.
    pub fn commit(&self, message: &str, env: &[(String, String)]) -> Result<bool> {
        match self.run_output(&[commands::COMMIT, flags::MESSAGE, message], env) {
            Ok(_) => Ok(true),
            Err(e) if NOTHING_TO_COMMIT_REGEX.is_match(&e.command_output()) => {
                info!("nothing to commit for {:?}", message.lines().next().unwrap_or_default());
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub fn commit_empty(&self, message: &str) -> Result<()> {
        self.run(&[commands::COMMIT, flags::ALLOW_EMPTY, flags::MESSAGE, message])
            .map(drop)
    }

    /// Stash local modifications; false when there was nothing to stash
    pub fn stash(&self) -> Result<bool> {
        let out = self.run(&[commands::STASH])?;
        Ok(!out.contains(errors::NO_LOCAL_CHANGES))
    }

    pub fn stash_pop(&self) -> Result<()> {
        self.run(&[commands::STASH, commands::STASH_POP]).map(drop)
    }

    // ── Objects ───────────────────────────────────────────────────────

    /// Raw `git log` of commits to check in, oldest first
    ///
    /// `range` limits the walk (e.g. `clearcase_ci..`); `all_parents`
    /// follows merged-in history instead of only first parents.
    pub fn checkin_log_raw(&self, range: Option<&str>, all_parents: bool) -> Result<String> {
        let mut args = vec![
            commands::LOG,
            flags::NUL_TERMINATED,
            flags::REVERSE,
            formats::CHECKIN_LOG,
        ];
        if !all_parents {
            args.push(flags::FIRST_PARENT);
        }
        args.extend(range);
        self.run(&args)
    }

    /// Raw name-status of the changes `id` introduces
    ///
    /// `root` lists every file of the commit instead of diffing against its parent.
    pub fn name_status_raw(&self, id: &str, root: bool) -> Result<String> {
        if root {
            self.run(&[
                commands::SHOW,
                flags::NAME_STATUS,
                flags::FIND_RENAMES,
                flags::NUL_TERMINATED,
                flags::IGNORE_SUBMODULES,
                formats::EMPTY,
                id,
            ])
        } else {
            let range = format!("{id}^..{id}");
            self.run(&[
                commands::DIFF,
                flags::NAME_STATUS,
                flags::FIND_RENAMES,
                flags::NUL_TERMINATED,
                flags::IGNORE_SUBMODULES,
                range.as_str(),
            ])
        }
    }

    /// Tree entry of `path` at `rev`, `None` when absent
    pub fn tree_entry(&self, rev: &str, path: &str) -> Result<Option<TreeEntry>> {
        let out = self.run(&[commands::LS_TREE, flags::NUL_TERMINATED, rev, flags::END_OF_OPTIONS, path])?;
        Ok(Parser::parse_tree_entry(&out))
    }

    /// Object id of `path` at `rev`, `None` when absent
    pub fn blob_id(&self, rev: &str, path: &str) -> Result<Option<String>> {
        Ok(self.tree_entry(rev, path)?.map(|e| e.id))
    }

    /// Content of the blob `path` has at `rev`
    pub fn blob_content(&self, rev: &str, path: &str) -> Result<Vec<u8>> {
        let object = format!("{rev}:{path}");
        self.run_output(&[commands::CAT_FILE, flags::BLOB, object.as_str()], &[])
            .map(|o| o.stdout)
    }

    /// Object id `path` would get if added
    pub fn hash_object(&self, path: &Path) -> Result<String> {
        let path = path.to_string_lossy().into_owned();
        Ok(self
            .run(&[commands::HASH_OBJECT, path.as_str()])?
            .trim()
            .to_string())
    }
}
