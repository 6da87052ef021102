//! Staged check-in of one Git commit into ClearCase
//!
//! Every element touched by the commit is checked out before anything is
//! written to the view. Either all checkouts are checked in with the commit
//! message, or all of them are cancelled.

use tracing::{debug, error, info, warn};

use super::Bridge;
use super::checkin::CheckinOptions;
use crate::error::{Error, Result};
use crate::git::constants::special;

/// Check-outs and the UCM activity of one commit being checked in
pub struct Transaction<'a> {
    bridge: &'a Bridge,
    options: &'a CheckinOptions,
    /// Commit whose content is written to the view
    source: String,
    comment: String,
    activity: Option<String>,
    /// Last synchronized commit, `None` for an initial check-in
    base: Option<String>,
    checked_out: Vec<String>,
}

impl<'a> Transaction<'a> {
    /// Open a transaction for commit `source`
    ///
    /// In UCM mode this sets (creating if needed) the activity named after
    /// `comment`. An initial check-in skips conflict detection.
    pub fn open(bridge: &'a Bridge, options: &'a CheckinOptions, source: &str, comment: &str) -> Result<Self> {
        let base = if options.initial {
            None
        } else {
            Some(bridge.git().merge_base(bridge.workspace().ci_tag(), special::HEAD)?)
        };
        let activity = bridge.cc().open_activity(comment)?;

        Ok(Self {
            bridge,
            options,
            source: source.to_string(),
            comment: comment.to_string(),
            activity,
            base,
            checked_out: Vec::new(),
        })
    }

    pub fn bridge(&self) -> &'a Bridge {
        self.bridge
    }

    /// Commit whose content is being checked in
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn checked_out(&self) -> &[String] {
        &self.checked_out
    }

    /// Track `path` for the final check-in (elements created by this transaction)
    pub fn record(&mut self, path: &str) {
        if !self.checked_out.iter().any(|p| p == path) {
            self.checked_out.push(path.to_string());
        }
    }

    /// Follow a move of a checked-out element
    pub fn replace(&mut self, from: &str, to: &str) {
        for path in &mut self.checked_out {
            if path == from {
                *path = to.to_string();
            }
        }
    }

    /// Check out `path` and, when configured, move the label onto it
    pub fn checkout(&mut self, path: &str) -> Result<()> {
        let cc = self.bridge.cc();
        cc.checkout_reserved(path)?;
        self.checked_out.push(path.to_string());
        if let Some(label) = &self.options.label {
            cc.make_label(label, path, true)?;
        }
        Ok(())
    }

    /// Label an element created by this transaction
    pub fn label(&self, path: &str) -> Result<()> {
        match &self.options.label {
            Some(label) => self.bridge.cc().make_label(label, path, false),
            None => Ok(()),
        }
    }

    /// Check out directory `dir` (`.` for the view root) unless already checked out
    pub fn stage_dir(&mut self, dir: &str) -> Result<()> {
        let dir = if dir.is_empty() { "." } else { dir };
        if self.checked_out.iter().any(|p| p == dir) {
            return Ok(());
        }
        self.checkout(dir)
    }

    /// Check out `path` for modification, verifying the view still holds
    /// the content Git last synchronized
    pub fn stage(&mut self, path: &str) -> Result<()> {
        if !self.checked_out.iter().any(|p| p == path) {
            self.checkout(path)?;
        }
        self.check_conflict(path)
    }

    fn check_conflict(&self, path: &str) -> Result<()> {
        let Some(base) = &self.base else {
            return Ok(());
        };
        let git = self.bridge.git();
        let workspace = self.bridge.workspace();

        let in_view = git.hash_object(&workspace.cc_path(path))?;
        let synchronized = git.blob_id(base, &workspace.git_relative(path))?;
        if synchronized.as_deref() == Some(in_view.as_str()) {
            return Ok(());
        }

        if self.options.ignore_conflicts {
            warn!("{} has been modified in ClearCase, checking in anyway", path);
            Ok(())
        } else {
            Err(Error::Conflict {
                path: path.to_string(),
            })
        }
    }

    /// Cancel every checkout and drop the activity
    ///
    /// Failures are logged; rollback always runs to completion.
    pub fn rollback(self) {
        let cc = self.bridge.cc();
        for path in &self.checked_out {
            if let Err(e) = cc.uncheckout(path) {
                error!("failed to cancel checkout of {}: {}", path, e);
            }
        }
        if let Some(activity) = &self.activity
            && let Err(e) = cc.remove_activity(activity)
        {
            error!("failed to remove activity {}: {}", activity, e);
        }
        info!(files = self.checked_out.len(), "rolled back");
    }

    /// Check in every checkout with the commit message
    ///
    /// Every element is attempted; the first failure is returned. Returns
    /// the paths that were checked in.
    pub fn commit(self) -> Result<Vec<String>> {
        let cc = self.bridge.cc();
        let mut first_error = None;
        let mut checked_in = Vec::with_capacity(self.checked_out.len());

        for path in &self.checked_out {
            match cc.checkin(&self.comment, path) {
                Ok(()) => {
                    debug!("checked in {}", path);
                    checked_in.push(path.clone());
                }
                Err(e) => {
                    error!("failed to check in {}: {}", path, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(checked_in),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::rc::Rc;

    use tempfile::TempDir;

    use super::*;
    use crate::config::Config;
    use crate::exec::CommandOutput;
    use crate::exec::scripted::ScriptedRunner;

    fn bridge(view: &TempDir) -> (Rc<ScriptedRunner>, Bridge) {
        let runner = Rc::new(ScriptedRunner::new());
        runner.on("git", &["merge-base"], CommandOutput::ok("base123\n"));
        let bridge =
            Bridge::with_runner(runner.clone(), Config::with_view(view.path()), "/repo", None).unwrap();
        (runner, bridge)
    }

    fn options() -> CheckinOptions {
        CheckinOptions {
            deliver: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_stage_dir_checks_out_once() {
        let view = TempDir::new().unwrap();
        let (runner, bridge) = bridge(&view);
        let options = options();
        let mut tx = Transaction::open(&bridge, &options, "abc", "msg").unwrap();

        tx.stage_dir("").unwrap();
        tx.stage_dir(".").unwrap();
        tx.stage_dir("src").unwrap();

        assert_eq!(tx.checked_out(), [".", "src"]);
        assert_eq!(runner.calls_starting_with("cleartool co").len(), 2);
    }

    #[test]
    fn test_checkout_moves_label() {
        let view = TempDir::new().unwrap();
        let (runner, bridge) = bridge(&view);
        let options = CheckinOptions {
            label: Some("REL_1".to_string()),
            ..options()
        };
        let mut tx = Transaction::open(&bridge, &options, "abc", "msg").unwrap();
        tx.checkout("a.c").unwrap();

        assert_eq!(
            runner.calls_starting_with("cleartool"),
            vec!["cleartool co -reserved -nc a.c", "cleartool mklabel -replace -nc REL_1 a.c"]
        );
    }

    #[test]
    fn test_stage_detects_conflict() {
        let view = TempDir::new().unwrap();
        fs::write(view.path().join("a.c"), "changed in ClearCase").unwrap();
        let (runner, bridge) = bridge(&view);
        runner.on("git", &["hash-object"], CommandOutput::ok("1111\n"));
        runner.on("git", &["ls-tree"], CommandOutput::ok("100644 blob 2222\ta.c\0"));

        let options = options();
        let mut tx = Transaction::open(&bridge, &options, "abc", "msg").unwrap();
        let err = tx.stage("a.c").unwrap_err();
        assert!(matches!(err, Error::Conflict { ref path } if path == "a.c"));
    }

    #[test]
    fn test_stage_forced_conflict_proceeds() {
        let view = TempDir::new().unwrap();
        let (runner, bridge) = bridge(&view);
        runner.on("git", &["hash-object"], CommandOutput::ok("1111\n"));
        runner.on("git", &["ls-tree"], CommandOutput::ok("100644 blob 2222\ta.c\0"));

        let options = CheckinOptions {
            ignore_conflicts: true,
            ..options()
        };
        let mut tx = Transaction::open(&bridge, &options, "abc", "msg").unwrap();
        tx.stage("a.c").unwrap();
        assert_eq!(tx.checked_out(), ["a.c"]);
    }

    #[test]
    fn test_stage_matching_content_passes() {
        let view = TempDir::new().unwrap();
        let (runner, bridge) = bridge(&view);
        runner.on("git", &["hash-object"], CommandOutput::ok("2222\n"));
        runner.on("git", &["ls-tree"], CommandOutput::ok("100644 blob 2222\ta.c\0"));

        let options = options();
        let mut tx = Transaction::open(&bridge, &options, "abc", "msg").unwrap();
        tx.stage("a.c").unwrap();
        assert_eq!(runner.calls_starting_with("git ls-tree -z base123 -- a.c").len(), 1);
    }

    #[test]
    fn test_initial_skips_conflict_detection() {
        let view = TempDir::new().unwrap();
        let (runner, bridge) = bridge(&view);
        let options = CheckinOptions {
            initial: true,
            ..options()
        };
        let mut tx = Transaction::open(&bridge, &options, "abc", "msg").unwrap();
        tx.stage("a.c").unwrap();

        assert!(runner.calls_starting_with("git merge-base").is_empty());
        assert!(runner.calls_starting_with("git hash-object").is_empty());
    }

    #[test]
    fn test_rollback_continues_past_failures() {
        let view = TempDir::new().unwrap();
        let (runner, bridge) = bridge(&view);
        runner.on("cleartool", &["unco", "-rm", "a.c"], CommandOutput::failed(1, "not checked out"));

        let options = CheckinOptions {
            initial: true,
            ..options()
        };
        let mut tx = Transaction::open(&bridge, &options, "abc", "msg").unwrap();
        tx.checkout("a.c").unwrap();
        tx.checkout("b.c").unwrap();
        tx.rollback();

        assert_eq!(
            runner.calls_starting_with("cleartool unco"),
            vec!["cleartool unco -rm a.c", "cleartool unco -rm b.c"]
        );
        assert!(runner.calls_starting_with("cleartool ci").is_empty());
    }

    #[test]
    fn test_commit_attempts_every_element() {
        let view = TempDir::new().unwrap();
        let (runner, bridge) = bridge(&view);
        runner.on("cleartool", &["ci", "-identical", "-c", "msg", "a.c"], CommandOutput::failed(1, "locked"));

        let options = CheckinOptions {
            initial: true,
            ..options()
        };
        let mut tx = Transaction::open(&bridge, &options, "abc", "msg").unwrap();
        tx.checkout("a.c").unwrap();
        tx.checkout("b.c").unwrap();

        assert!(tx.commit().is_err());
        assert_eq!(
            runner.calls_starting_with("cleartool ci"),
            vec!["cleartool ci -identical -c msg a.c", "cleartool ci -identical -c msg b.c"]
        );
    }

    #[test]
    fn test_replace_follows_move() {
        let view = TempDir::new().unwrap();
        let (_runner, bridge) = bridge(&view);
        let options = CheckinOptions {
            initial: true,
            ..options()
        };
        let mut tx = Transaction::open(&bridge, &options, "abc", "msg").unwrap();
        tx.checkout("old.c").unwrap();
        tx.replace("old.c", "new.c");
        tx.record("new.c");
        assert_eq!(tx.checked_out(), ["new.c"]);
    }
}
