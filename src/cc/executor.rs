//! cleartool command executor
//!
//! Handles running cleartool commands inside the view and capturing their output.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, info};

use super::CcMode;
use super::constants::{self, commands, flags, formats, patterns};
use super::parser::Parser;
use crate::error::{Error, Result};
use crate::exec::{self, CommandRunner, Invocation, ProcessRunner};

/// Executor for cleartool commands
#[derive(Clone)]
pub struct CcExecutor {
    runner: Rc<dyn CommandRunner>,
    /// View directory every command runs in
    view: PathBuf,
    mode: CcMode,
}

impl CcExecutor {
    /// Create an executor running real cleartool processes
    pub fn new(view: impl Into<PathBuf>, mode: CcMode) -> Self {
        Self::with_runner(Rc::new(ProcessRunner), view, mode)
    }

    pub fn with_runner(runner: Rc<dyn CommandRunner>, view: impl Into<PathBuf>, mode: CcMode) -> Self {
        Self {
            runner,
            view: view.into(),
            mode,
        }
    }

    /// Run a cleartool command with the given arguments
    pub fn run(&self, args: &[&str]) -> Result<String> {
        let args = exec::owned_args(args);
        exec::execute(self.runner.as_ref(), &self.invocation(&args)).map(|o| o.stdout_text())
    }

    /// Run a cleartool command whose failure is expected to be benign
    pub fn run_lenient(&self, args: &[&str]) -> Result<String> {
        let args = exec::owned_args(args);
        exec::execute_lenient(self.runner.as_ref(), &self.invocation(&args))
    }

    fn invocation<'a>(&'a self, args: &'a [String]) -> Invocation<'a> {
        Invocation {
            program: constants::CLEARTOOL_COMMAND,
            args,
            cwd: &self.view,
            env: &[],
        }
    }

    /// Check that the view directory exists
    pub fn validate(&self) -> Result<()> {
        if self.view.is_dir() {
            Ok(())
        } else {
            Err(Error::MissingClearCaseView(self.view.clone()))
        }
    }

    /// Run `cleartool update` (reports failure when there is nothing to update)
    pub fn update(&self, path: &str) -> Result<()> {
        self.run_lenient(&[commands::UPDATE, path]).map(drop)
    }

    /// Run `cleartool lshistory -recurse` over the included paths
    pub fn history_raw(&self, since: Option<&str>, include: &[String]) -> Result<String> {
        let format = self.mode.history_format();
        let mut args = vec![commands::LSHISTORY, flags::FORMAT, format.as_str(), flags::RECURSE];
        if let Some(since) = since {
            args.push(flags::SINCE);
            args.push(since);
        }
        args.extend(include.iter().map(String::as_str));
        self.run(&args)
    }

    /// Run `cleartool lshistory` for a single element
    pub fn element_history_raw(&self, file: &str) -> Result<String> {
        self.run_lenient(&[commands::LSHISTORY, flags::FORMAT, formats::ELEMENT_HISTORY, file])
    }

    /// Run `cleartool ls -recurse -short` over the included paths (`file@@version` lines)
    pub fn list_versions_raw(&self, include: &[String]) -> Result<String> {
        let mut args = vec![commands::LS, flags::RECURSE, flags::SHORT];
        args.extend(include.iter().map(String::as_str));
        self.run(&args)
    }

    /// Copy the version named by `extended_path` to `dest`
    pub fn get(&self, dest: &Path, extended_path: &str) -> Result<()> {
        let dest = dest.to_string_lossy().into_owned();
        self.run(&[commands::GET, flags::TO, dest.as_str(), extended_path]).map(drop)
    }

    /// Diff a directory version against its predecessor
    pub fn directory_diff_raw(&self, extended_path: &str) -> Result<String> {
        self.run_lenient(&[commands::DIFF, flags::DIFF_FORMAT, flags::PREDECESSOR, extended_path])
    }

    /// `%Nd` creation date of a version
    pub fn describe_date(&self, extended_path: &str) -> Result<String> {
        self.describe(formats::DATE, extended_path)
    }

    /// `%Vn` version label of the element version selected by the view
    pub fn describe_version(&self, path: &str) -> Result<String> {
        self.describe(formats::VERSION, path)
    }

    fn describe(&self, format: &str, path: &str) -> Result<String> {
        Ok(self
            .run(&[commands::DESCRIBE, flags::FORMAT, format, path])?
            .trim()
            .to_string())
    }

    pub fn checkout_reserved(&self, path: &str) -> Result<()> {
        self.run(&[commands::CHECKOUT, flags::RESERVED, flags::NC, path]).map(drop)
    }

    /// Undo a checkout, discarding the checked-out copy
    pub fn uncheckout(&self, path: &str) -> Result<()> {
        self.run(&[commands::UNCHECKOUT, flags::REMOVE, path]).map(drop)
    }

    /// Check in `path`, also when its content did not change
    pub fn checkin(&self, comment: &str, path: &str) -> Result<()> {
        self.run(&[commands::CHECKIN, flags::IDENTICAL, flags::COMMENT, comment, path])
            .map(drop)
    }

    /// Attach `label` to the version of `path`, moving it when `replace` is set
    pub fn make_label(&self, label: &str, path: &str, replace: bool) -> Result<()> {
        let mut args = vec![commands::MKLABEL];
        if replace {
            args.push(flags::REPLACE);
        }
        args.extend([flags::NC, label, path]);
        self.run(&args).map(drop)
    }

    pub fn make_element(&self, path: &str) -> Result<()> {
        self.run(&[commands::MKELEM, flags::NC, path]).map(drop)
    }

    pub fn make_directory_element(&self, path: &str) -> Result<()> {
        self.run(&[commands::MKELEM, flags::NC, flags::ELEMENT_TYPE, flags::DIRECTORY, path])
            .map(drop)
    }

    /// Remove the name of an element from its (checked-out) directory
    pub fn remove_name(&self, path: &str) -> Result<()> {
        self.run(&[commands::RMNAME, path]).map(drop)
    }

    pub fn move_element(&self, from: &str, to: &str) -> Result<()> {
        self.run(&[commands::MOVE, flags::NC, from, to]).map(drop)
    }

    pub fn make_symlink(&self, target: &str, path: &str) -> Result<()> {
        self.run(&[commands::LINK, flags::SYMBOLIC, target, path]).map(drop)
    }

    // ── UCM ───────────────────────────────────────────────────────────

    /// Rebase the development stream onto the recommended baselines (UCM only)
    pub fn rebase_stream(&self) -> Result<()> {
        if self.mode != CcMode::Ucm {
            return Ok(());
        }
        let out = self.run(&[commands::REBASE, flags::RECOMMENDED, flags::FORCE])?;
        if !out.starts_with(patterns::NO_REBASE_NEEDED) {
            debug!("{}", out.trim());
            let out = self.run(&[commands::REBASE, flags::COMPLETE])?;
            debug!("{}", out.trim());
        }
        Ok(())
    }

    /// Set (creating if needed) the activity whose headline is `comment` (UCM only)
    ///
    /// Returns the activity name, `None` in base ClearCase.
    pub fn open_activity(&self, comment: &str) -> Result<Option<String>> {
        if self.mode != CcMode::Ucm {
            return Ok(None);
        }

        let existing = Parser::parse_activity_list(
            &self.run(&[commands::LSACT, flags::FORMAT, formats::ACTIVITY_LIST])?,
        )
        .into_iter()
        .find(|(headline, _)| headline == comment)
        .map(|(_, name)| name);

        if let Some(name) = existing {
            self.run(&[commands::SETACT, name.as_str()])?;
            return Ok(Some(name));
        }

        let out = self.run(&[commands::MKACT, flags::FORCE, flags::HEADLINE, comment])?;
        let name = Parser::parse_created_activity(&out)
            .ok_or_else(|| Error::Parse(format!("unexpected mkact output: {}", out.trim())))?;
        info!(activity = %name, "created activity");
        Ok(Some(name))
    }

    /// Unset and remove an activity
    pub fn remove_activity(&self, activity: &str) -> Result<()> {
        self.run(&[commands::SETACT, flags::NONE])?;
        self.run_lenient(&[commands::RMACT, flags::FORCE, activity]).map(drop)
    }

    /// Deliver the stream to its integration stream (UCM only)
    pub fn deliver(&self) -> Result<()> {
        if self.mode != CcMode::Ucm {
            return Ok(());
        }
        self.run(&[commands::DELIVER, flags::FORCE])?;
        self.run(&[commands::DELIVER, flags::COMPLETE_SHORT, flags::FORCE])
            .map(drop)
    }

    /// Full commit message for a history comment field
    ///
    /// UCM history carries activity names; their headline is the message.
    pub fn real_comment(&self, comment: &str) -> Result<String> {
        match self.mode {
            CcMode::Base => Ok(comment.to_string()),
            CcMode::Ucm if comment.is_empty() => Ok(String::new()),
            CcMode::Ucm => self.run(&[commands::LSACT, flags::FORMAT, formats::HEADLINE, comment]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::CommandOutput;
    use crate::exec::scripted::ScriptedRunner;

    fn executor(mode: CcMode) -> (Rc<ScriptedRunner>, CcExecutor) {
        let runner = Rc::new(ScriptedRunner::new());
        let cc = CcExecutor::with_runner(runner.clone(), "/view", mode);
        (runner, cc)
    }

    #[test]
    fn test_history_raw_arguments() {
        let (runner, cc) = executor(CcMode::Base);
        cc.history_raw(Some("01-Jan-2024.10:00:00"), &["src".to_string(), "doc".to_string()])
            .unwrap();

        assert_eq!(
            runner.calls(),
            vec![
                "cleartool lsh -fmt %o%m|%Nd|%u|%En|%Vn|%Nc\\n -recurse -since 01-Jan-2024.10:00:00 src doc"
            ]
        );
    }

    #[test]
    fn test_label_with_and_without_replace() {
        let (runner, cc) = executor(CcMode::Base);
        cc.make_label("REL_1", "a.c", true).unwrap();
        cc.make_label("REL_1", "dir", false).unwrap();

        assert_eq!(
            runner.calls(),
            vec![
                "cleartool mklabel -replace -nc REL_1 a.c",
                "cleartool mklabel -nc REL_1 dir"
            ]
        );
    }

    #[test]
    fn test_base_mode_skips_ucm_operations() {
        let (runner, cc) = executor(CcMode::Base);
        cc.rebase_stream().unwrap();
        cc.deliver().unwrap();
        assert_eq!(cc.open_activity("Fix").unwrap(), None);
        assert_eq!(cc.real_comment("Fix bug").unwrap(), "Fix bug");
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_open_activity_reuses_existing() {
        let (runner, cc) = executor(CcMode::Ucm);
        runner.on(
            "cleartool",
            &["lsactivity"],
            CommandOutput::ok("Fix bug|fix_bug_1@@@Other|other_2@@@"),
        );

        assert_eq!(cc.open_activity("Fix bug").unwrap().as_deref(), Some("fix_bug_1"));
        assert_eq!(runner.calls_starting_with("cleartool setact"), vec!["cleartool setact fix_bug_1"]);
        assert!(runner.calls_starting_with("cleartool mkact").is_empty());
    }

    #[test]
    fn test_open_activity_creates_missing() {
        let (runner, cc) = executor(CcMode::Ucm);
        runner.on(
            "cleartool",
            &["mkact"],
            CommandOutput::ok("Created activity \"new_work_3\".\n"),
        );

        assert_eq!(cc.open_activity("New work").unwrap().as_deref(), Some("new_work_3"));
        assert_eq!(
            runner.calls_starting_with("cleartool mkact"),
            vec!["cleartool mkact -f -headline New work"]
        );
    }

    #[test]
    fn test_rebase_stream_completes_when_needed() {
        let (runner, cc) = executor(CcMode::Ucm);
        runner.on("cleartool", &["rebase", "-rec"], CommandOutput::ok("Rebasing stream..."));
        cc.rebase_stream().unwrap();
        assert_eq!(runner.calls_starting_with("cleartool rebase").len(), 2);

        let (runner, cc) = executor(CcMode::Ucm);
        runner.on(
            "cleartool",
            &["rebase", "-rec"],
            CommandOutput::ok("No rebase needed from stream"),
        );
        cc.rebase_stream().unwrap();
        assert_eq!(runner.calls_starting_with("cleartool rebase").len(), 1);
    }

    #[test]
    fn test_validate_missing_view() {
        let cc = CcExecutor::new("/definitely/not/a/view", CcMode::Base);
        assert!(matches!(cc.validate(), Err(Error::MissingClearCaseView(_))));
    }
}
