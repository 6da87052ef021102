//! Local modifications set aside around an operation

use scopeguard::ScopeGuard;
use tracing::{error, info};

use crate::error::Result;
use crate::git::GitExecutor;

/// Run `operation` with local modifications stashed when `enabled`
///
/// The stash is popped on every exit path. A pop failure is returned when
/// the operation succeeded and only logged when it failed.
pub fn with_stash<T>(git: &GitExecutor, enabled: bool, operation: impl FnOnce() -> Result<T>) -> Result<T> {
    if !enabled || !git.stash()? {
        return operation();
    }
    info!("stashed local modifications");

    let guard = scopeguard::guard((), |_| {
        if let Err(e) = git.stash_pop() {
            error!("failed to restore stashed modifications: {}", e);
        }
    });
    let value = operation()?;
    ScopeGuard::into_inner(guard);

    git.stash_pop()?;
    Ok(value)
}
