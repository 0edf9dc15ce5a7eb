// file: src/models/snapshot.rs
// description: point-in-time status of one working copy
// reference: internal data structures

use crate::models::BranchName;
use serde::Serialize;

/// Status of one repository as observed during a single refresh.
///
/// `current_branch` is `None` when HEAD is detached. After a fresh `git init`
/// it names the unborn branch, which is not yet listed in `branches`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoStatusSnapshot {
    /// Last path segment of the discovered directory.
    pub name: String,
    pub current_branch: Option<BranchName>,
    /// Local branches in lexical order.
    pub branches: Vec<BranchName>,
    /// Tracked files with staged or unstaged changes. Untracked files are not counted.
    pub modified_count: usize,
}

impl RepoStatusSnapshot {
    pub fn is_dirty(&self) -> bool {
        self.modified_count > 0
    }

    /// Whether a branch switch may be offered for this repository.
    pub fn is_switchable(&self) -> bool {
        !self.is_dirty()
    }

    pub fn is_detached(&self) -> bool {
        self.current_branch.is_none()
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.branches.iter().any(|b| b == name)
    }
}
