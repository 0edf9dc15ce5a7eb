// file: src/repository/status.rs
// description: status snapshots and the guarded branch switch
// reference: blocking git work driven from tokio tasks

use crate::error::{CheckoutError, Result};
use crate::models::{BranchName, RepoStatusSnapshot};
use crate::repository::backend::WorkingCopy;
use crate::repository::handle::RepositoryHandle;
use crate::utils::logging::{LogSink, TracingSink};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct RepoStatusService {
    sink: Arc<dyn LogSink>,
}

impl RepoStatusService {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Reads branch and modification state. Never touches the working tree.
    pub async fn snapshot(&self, handle: &RepositoryHandle) -> Result<RepoStatusSnapshot> {
        let guard = handle.lock().await;
        let name = handle.name().to_string();

        tokio::task::spawn_blocking(move || read_snapshot(&**guard, name)).await?
    }

    /// Switches `handle` to the local branch `target`.
    ///
    /// Refused with [`CheckoutError::DirtyWorkingTree`] whenever tracked files
    /// are modified. `timeout` cancels the operation the same way `cancel` does;
    /// the repository lock is released on every exit path.
    pub async fn checkout(
        &self,
        handle: &RepositoryHandle,
        target: &BranchName,
        cancel: &CancellationToken,
        timeout: Option<Duration>,
    ) -> std::result::Result<BranchName, CheckoutError> {
        let cancel = cancel.child_token();
        let _deadline = timeout.map(|after| Deadline::start(after, cancel.clone()));

        let guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CheckoutError::Cancelled),
            guard = handle.lock() => guard,
        };

        self.sink.info(&format!(
            "{}: Checking out branch {}...",
            handle.name(),
            target
        ));

        let target = target.clone();
        let token = cancel.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut guard = guard;
            switch_locked(&mut **guard, &target, &token)
        })
        .await
        .map_err(|e| CheckoutError::Failed(e.to_string()))?;

        match &result {
            Ok(branch) => self
                .sink
                .info(&format!("{}: Now on branch {}", handle.name(), branch)),
            Err(err) => {
                warn!("Checkout in {} failed: {}", handle.root().display(), err);
                self.sink
                    .info(&format!("{}: Checkout failed: {}", handle.name(), err));
            }
        }

        result
    }
}

impl Default for RepoStatusService {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

fn read_snapshot(working_copy: &dyn WorkingCopy, name: String) -> Result<RepoStatusSnapshot> {
    working_copy.ensure_accessible()?;

    let read = || -> Result<RepoStatusSnapshot> {
        Ok(RepoStatusSnapshot {
            name,
            current_branch: working_copy.current_branch()?,
            branches: working_copy.local_branches()?,
            modified_count: working_copy.modified_count()?,
        })
    };

    // storage removed while reading surfaces as an access error
    let snapshot = read().map_err(|err| working_copy.ensure_accessible().err().unwrap_or(err))?;
    debug!("Snapshot of {}: {:?}", working_copy.workdir().display(), snapshot);
    Ok(snapshot)
}

fn switch_locked(
    working_copy: &mut dyn WorkingCopy,
    target: &BranchName,
    cancel: &CancellationToken,
) -> std::result::Result<BranchName, CheckoutError> {
    if cancel.is_cancelled() {
        return Err(CheckoutError::Cancelled);
    }

    working_copy.ensure_accessible()?;

    if !working_copy.has_local_branch(target)? {
        return Err(CheckoutError::BranchNotFound(target.to_string()));
    }

    let modified = working_copy.modified_count()?;
    if modified > 0 {
        return Err(CheckoutError::DirtyWorkingTree(modified));
    }

    if working_copy.current_branch()?.as_ref() == Some(target) {
        debug!("Already on {}", target);
        return Ok(target.clone());
    }

    working_copy.switch_branch(target, cancel)?;

    working_copy
        .current_branch()?
        .ok_or_else(|| CheckoutError::Failed("HEAD is detached after checkout".to_string()))
}

/// Cancels a token once the timeout elapses; stops the timer when dropped.
struct Deadline(JoinHandle<()>);

impl Deadline {
    fn start(after: Duration, cancel: CancellationToken) -> Self {
        Self(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            cancel.cancel();
        }))
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        self.0.abort();
    }
}
