//! Moving the synchronization markers onto a chosen commit

use tracing::info;

use super::Bridge;
use crate::error::Result;

impl Bridge {
    /// Mark `commit` as the last synchronized state
    ///
    /// Moves both the replay branch and the marker tag.
    pub fn reset(&self, commit: &str) -> Result<()> {
        let workspace = self.workspace();
        self.git().force_branch(workspace.cc_tag(), Some(commit))?;
        self.git().force_tag(workspace.ci_tag(), commit)?;
        info!("{} and {} now point at {}", workspace.cc_tag(), workspace.ci_tag(), commit);
        Ok(())
    }
}
