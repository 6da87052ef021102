//! TestRepo helper for integration tests.
//!
//! Provides a temporary Git repository and a ClearCase view directory next to it.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A temporary Git work tree on branch `main` with one initial commit.
///
/// Both directories are cleaned up when the TestRepo is dropped.
pub struct TestRepo {
    dir: TempDir,
    view: TempDir,
}

impl TestRepo {
    /// Create a repository with `README` committed on `main`.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let view = TempDir::new().expect("Failed to create view directory");
        let repo = Self { dir, view };

        repo.git(&["init", "-q"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.write_file("README", "readme\n");
        repo.commit_all("Initial commit");
        repo
    }

    /// Get the path to the work tree root.
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Get the path to the ClearCase view directory.
    pub fn view(&self) -> &Path {
        self.view.path()
    }

    /// Mark HEAD as synchronized: create the replay branch and the marker tag.
    pub fn mark_synchronized(&self) {
        self.git(&["branch", "-f", "clearcase", "HEAD"]);
        self.git(&["tag", "-f", "clearcase_ci", "HEAD"]);
    }

    /// Execute a git command in this repository.
    ///
    /// # Panics
    ///
    /// Panics if the command fails to execute or returns a non-zero exit code.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("Failed to execute git command");

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!(
                "git {:?} failed with exit code {:?}:\n{}",
                args,
                output.status.code(),
                stderr
            );
        }

        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    /// Stage everything and commit it.
    pub fn commit_all(&self, message: &str) {
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "-m", message]);
    }

    /// Write a file in the work tree.
    pub fn write_file(&self, name: &str, content: &str) {
        write(&self.path().join(name), content);
    }

    /// Write a file in the view.
    pub fn write_view_file(&self, name: &str, content: &str) {
        write(&self.view().join(name), content);
    }

    /// Read a file from the work tree.
    ///
    /// Returns an empty string if the file does not exist.
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.path().join(name)).unwrap_or_default()
    }

    /// Read a file from the view.
    pub fn read_view_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.view().join(name)).unwrap_or_default()
    }

    /// Resolve a revision to its commit id.
    pub fn rev_parse(&self, rev: &str) -> String {
        self.git(&["rev-parse", rev]).trim().to_string()
    }

    /// `author|subject` of the commits reachable from `rev`, newest first.
    pub fn log(&self, rev: &str) -> Vec<String> {
        self.git(&["log", "--format=%an|%s", rev])
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Files changed by commit `rev`.
    pub fn changed_files(&self, rev: &str) -> Vec<String> {
        self.git(&["show", "--name-only", "--format=", rev])
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    std::fs::write(path, content).expect("Failed to write file");
}
