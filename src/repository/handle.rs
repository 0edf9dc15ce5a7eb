// file: src/repository/handle.rs
// description: shareable reference to one discovered working copy
// reference: internal module structure

use crate::repository::backend::WorkingCopy;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, Weak};
use tokio::sync::{Mutex, OwnedMutexGuard};

pub(crate) type WorkingCopyGuard = OwnedMutexGuard<Box<dyn WorkingCopy>>;
type SharedWorkingCopy = Arc<Mutex<Box<dyn WorkingCopy>>>;

/// Hands out one lock scope per working tree.
///
/// Keyed by the canonical working-tree root, so handles located from
/// different directories of the same repository, or in different refresh
/// cycles, serialize against each other. Entries die with their last handle.
#[derive(Clone, Default)]
pub struct LockRegistry {
    scopes: Arc<std::sync::Mutex<HashMap<PathBuf, Weak<Mutex<Box<dyn WorkingCopy>>>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of working trees with at least one live handle.
    pub fn len(&self) -> usize {
        let mut scopes = self.scopes.lock().unwrap_or_else(PoisonError::into_inner);
        scopes.retain(|_, scope| scope.strong_count() > 0);
        scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the live scope for the tree of `working_copy`, or registers
    /// `working_copy` as the new one.
    fn scope(&self, working_copy: Box<dyn WorkingCopy>) -> SharedWorkingCopy {
        let key = fs::canonicalize(working_copy.workdir())
            .unwrap_or_else(|_| working_copy.workdir().to_path_buf());

        let mut scopes = self.scopes.lock().unwrap_or_else(PoisonError::into_inner);
        scopes.retain(|_, scope| scope.strong_count() > 0);

        if let Some(existing) = scopes.get(&key).and_then(Weak::upgrade) {
            return existing;
        }

        let scope = Arc::new(Mutex::new(working_copy));
        scopes.insert(key, Arc::downgrade(&scope));
        scope
    }
}

impl fmt::Debug for LockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockRegistry")
            .field("trees", &self.len())
            .finish()
    }
}

/// Handle produced by [`RepoLocator`] for a single refresh cycle.
///
/// Clones share one lock, and so do handles registered through the same
/// [`LockRegistry`] for the same working tree. Every snapshot and checkout
/// against one repository is serialized while distinct repositories proceed
/// in parallel.
///
/// [`RepoLocator`]: crate::repository::RepoLocator
#[derive(Clone)]
pub struct RepositoryHandle {
    path: PathBuf,
    root: PathBuf,
    name: String,
    cycle: u64,
    working_copy: SharedWorkingCopy,
}

impl RepositoryHandle {
    /// Handle with a lock of its own.
    pub fn new(path: &Path, cycle: u64, working_copy: Box<dyn WorkingCopy>) -> Self {
        let root = working_copy.workdir().to_path_buf();
        Self::with_scope(path, root, cycle, Arc::new(Mutex::new(working_copy)))
    }

    /// Handle sharing the lock of every other handle `locks` issued for the
    /// same working tree.
    pub fn registered(
        path: &Path,
        cycle: u64,
        working_copy: Box<dyn WorkingCopy>,
        locks: &LockRegistry,
    ) -> Self {
        let root = working_copy.workdir().to_path_buf();
        Self::with_scope(path, root, cycle, locks.scope(working_copy))
    }

    fn with_scope(path: &Path, root: PathBuf, cycle: u64, working_copy: SharedWorkingCopy) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            path: path.to_path_buf(),
            root,
            name,
            cycle,
            working_copy,
        }
    }

    /// Directory the handle was located from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Top-level directory of the working tree, at or above [`path`](Self::path).
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// True when both handles serialize on the same lock.
    pub fn shares_lock_with(&self, other: &RepositoryHandle) -> bool {
        Arc::ptr_eq(&self.working_copy, &other.working_copy)
    }

    pub(crate) async fn lock(&self) -> WorkingCopyGuard {
        Arc::clone(&self.working_copy).lock_owned().await
    }
}

impl fmt::Debug for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryHandle")
            .field("path", &self.path)
            .field("root", &self.root)
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}
