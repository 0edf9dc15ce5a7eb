// file: src/repository/locator.rs
// description: decides whether a candidate directory is a working copy

use crate::error::LocateError;
use crate::repository::backend::WorkingCopy;
use crate::repository::git::GitWorkingCopy;
use crate::repository::handle::{LockRegistry, RepositoryHandle};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct RepoLocator {
    cycle: u64,
    locks: LockRegistry,
}

impl RepoLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles produced by this locator are tagged with `cycle`.
    pub fn for_cycle(cycle: u64) -> Self {
        Self {
            cycle,
            locks: LockRegistry::new(),
        }
    }

    /// Shares lock scopes with every other locator holding `locks`.
    pub fn with_locks(mut self, locks: LockRegistry) -> Self {
        self.locks = locks;
        self
    }

    /// Returns a handle when `directory` lies inside a working copy.
    ///
    /// A directory that is not under version control yields `Ok(None)`; only an
    /// unreadable directory is an error.
    pub fn locate(&self, directory: &Path) -> Result<Option<RepositoryHandle>, LocateError> {
        match GitWorkingCopy::discover(directory)? {
            Some(working_copy) => {
                debug!(
                    "Found working copy {} for {}",
                    working_copy.workdir().display(),
                    directory.display()
                );
                Ok(Some(RepositoryHandle::registered(
                    directory,
                    self.cycle,
                    Box::new(working_copy),
                    &self.locks,
                )))
            }
            None => {
                debug!("Not a repository: {}", directory.display());
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckoutError;
    use crate::models::BranchName;
    use crate::repository::RepoStatusService;
    use git2::{Repository, RepositoryInitOptions, Signature};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    /// Repository on `main` with a `dev` branch and plain subdirectories `x/` and `y/`.
    fn repo_with_subdirs(dir: &Path) {
        let mut options = RepositoryInitOptions::new();
        options.initial_head("main");
        let repo = Repository::init_opts(dir, &options).unwrap();

        fs::write(dir.join("README.md"), "# project").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("README.md")).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let signature = Signature::now("Test", "test@example.com").unwrap();
        let commit = repo
            .commit(Some("HEAD"), &signature, &signature, "init", &tree, &[])
            .unwrap();
        repo.branch("dev", &repo.find_commit(commit).unwrap(), false)
            .unwrap();

        fs::create_dir(dir.join("x")).unwrap();
        fs::create_dir(dir.join("y")).unwrap();
    }

    #[test]
    fn test_plain_directory_is_absent() {
        let temp = TempDir::new().unwrap();
        let plain = temp.path().join("not-a-repo");
        fs::create_dir(&plain).unwrap();

        assert!(RepoLocator::new().locate(&plain).unwrap().is_none());
    }

    #[test]
    fn test_handle_named_after_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("repoA");
        Repository::init(&dir).unwrap();

        let handle = RepoLocator::for_cycle(7).locate(&dir).unwrap().unwrap();

        assert_eq!(handle.name(), "repoA");
        assert_eq!(handle.path(), dir.as_path());
        assert_eq!(handle.cycle(), 7);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_error() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let locked = temp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // root ignores permission bits
        let readable = fs::read_dir(&locked).is_ok();
        let result = RepoLocator::new().locate(&locked);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert!(matches!(result, Err(LocateError::Io { .. })));
        }
    }

    #[test]
    fn test_subdirectories_share_one_lock() {
        let temp = TempDir::new().unwrap();
        repo_with_subdirs(temp.path());
        let locator = RepoLocator::for_cycle(1);

        let hx = locator.locate(&temp.path().join("x")).unwrap().unwrap();
        let hy = locator.locate(&temp.path().join("y")).unwrap().unwrap();

        assert_eq!(hx.root(), hy.root());
        assert!(hx.shares_lock_with(&hy));
    }

    #[test]
    fn test_cycles_share_lock_through_registry() {
        let temp = TempDir::new().unwrap();
        repo_with_subdirs(temp.path());
        let locks = LockRegistry::new();

        let stale = RepoLocator::for_cycle(1)
            .with_locks(locks.clone())
            .locate(temp.path())
            .unwrap()
            .unwrap();
        let fresh = RepoLocator::for_cycle(2)
            .with_locks(locks.clone())
            .locate(temp.path())
            .unwrap()
            .unwrap();
        let unrelated = RepoLocator::for_cycle(2).locate(temp.path()).unwrap().unwrap();

        assert!(stale.shares_lock_with(&fresh));
        assert!(!fresh.shares_lock_with(&unrelated));
        assert_eq!(locks.len(), 1);

        drop(stale);
        drop(fresh);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_waits_for_lock_held_through_sibling() {
        let temp = TempDir::new().unwrap();
        repo_with_subdirs(temp.path());
        let locator = RepoLocator::for_cycle(1);
        let hx = locator.locate(&temp.path().join("x")).unwrap().unwrap();
        let hy = locator.locate(&temp.path().join("y")).unwrap().unwrap();
        let service = RepoStatusService::default();
        let dev = BranchName::new("dev").unwrap();

        let guard = hx.lock().await;
        let blocked = service
            .checkout(
                &hy,
                &dev,
                &CancellationToken::new(),
                Some(Duration::from_millis(200)),
            )
            .await;
        assert_eq!(blocked, Err(CheckoutError::Cancelled));
        drop(guard);

        let snapshot = service.snapshot(&hx).await.unwrap();
        assert_eq!(snapshot.current_branch, Some(BranchName::new("main").unwrap()));

        let switched = service
            .checkout(&hy, &dev, &CancellationToken::new(), None)
            .await;
        assert_eq!(switched, Ok(dev));
    }
}
