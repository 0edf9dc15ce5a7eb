// file: src/repository/backend.rs
// description: capability set every version-control backend provides
// reference: internal abstraction over the git binding

use crate::error::{CheckoutError, Result};
use crate::models::BranchName;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// An opened working copy.
///
/// Implementations are driven from blocking worker threads and are always
/// accessed behind the per-repository lock held by [`RepositoryHandle`].
///
/// [`RepositoryHandle`]: crate::repository::RepositoryHandle
pub trait WorkingCopy: Send {
    /// Top-level directory of the working tree.
    fn workdir(&self) -> &Path;

    /// Fails with `MrgitError::RepositoryAccess` when the on-disk storage is gone.
    fn ensure_accessible(&self) -> Result<()>;

    /// `None` when HEAD is detached.
    fn current_branch(&self) -> Result<Option<BranchName>>;

    /// Local branches in lexical order.
    fn local_branches(&self) -> Result<Vec<BranchName>>;

    /// Number of tracked paths with staged or unstaged changes.
    fn modified_count(&self) -> Result<usize>;

    fn has_local_branch(&self, name: &BranchName) -> Result<bool>;

    /// Rewrites the working tree to `target` and moves HEAD onto it.
    ///
    /// HEAD only moves once the tree update has completed. On failure or
    /// cancellation tracked files are restored to the current HEAD.
    fn switch_branch(
        &mut self,
        target: &BranchName,
        cancel: &CancellationToken,
    ) -> std::result::Result<(), CheckoutError>;
}
