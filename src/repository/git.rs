// file: src/repository/git.rs
// description: git working copy backed by libgit2
// reference: https://docs.rs/git2

use crate::error::{CheckoutError, LocateError, MrgitError, Result};
use crate::models::BranchName;
use crate::repository::backend::WorkingCopy;
use git2::build::CheckoutBuilder;
use git2::{
    BranchType, CheckoutNotificationType, ErrorClass, ErrorCode, Repository, Status,
    StatusOptions,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct GitWorkingCopy {
    repo: Repository,
    workdir: PathBuf,
}

impl GitWorkingCopy {
    /// Searches `dir` and its ancestors for a non-bare git repository.
    pub fn discover(dir: &Path) -> std::result::Result<Option<Self>, LocateError> {
        fs::read_dir(dir).map_err(|source| LocateError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let repo = match Repository::discover(dir) {
            Ok(repo) => repo,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) if e.class() == ErrorClass::Os => {
                return Err(LocateError::Io {
                    path: dir.to_path_buf(),
                    source: io::Error::other(e.message().to_string()),
                });
            }
            Err(e) => {
                warn!("Ignoring unusable repository at {}: {}", dir.display(), e);
                return Ok(None);
            }
        };

        let Some(workdir) = repo.workdir().map(Path::to_path_buf) else {
            debug!("Skipping bare repository: {}", repo.path().display());
            return Ok(None);
        };

        Ok(Some(Self { repo, workdir }))
    }

    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open(path)?;
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| MrgitError::Validation(format!("{} is bare", path.display())))?;
        Ok(Self { repo, workdir })
    }

    fn unborn_branch(&self) -> Result<Option<BranchName>> {
        let head = self.repo.find_reference("HEAD")?;
        Ok(head
            .symbolic_target()
            .and_then(|target| target.strip_prefix("refs/heads/"))
            .and_then(|name| BranchName::new(name).ok()))
    }

    fn restore_head(&self) {
        let mut builder = CheckoutBuilder::new();
        builder.force();
        match self.repo.checkout_head(Some(&mut builder)) {
            Ok(()) => info!("Restored {} to HEAD", self.workdir.display()),
            Err(e) => warn!(
                "Failed to restore {} after aborted checkout: {}",
                self.workdir.display(),
                e
            ),
        }
    }
}

impl WorkingCopy for GitWorkingCopy {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn ensure_accessible(&self) -> Result<()> {
        if self.repo.path().is_dir() && self.workdir.is_dir() {
            return Ok(());
        }
        Err(MrgitError::RepositoryAccess {
            path: self.workdir.clone(),
            message: format!("{} no longer exists", self.repo.path().display()),
        })
    }

    fn current_branch(&self) -> Result<Option<BranchName>> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => {
                Ok(head.shorthand().and_then(|name| BranchName::new(name).ok()))
            }
            Ok(_) => Ok(None),
            Err(e) if e.code() == ErrorCode::UnbornBranch => self.unborn_branch(),
            Err(e) => Err(e.into()),
        }
    }

    fn local_branches(&self) -> Result<Vec<BranchName>> {
        let mut names = Vec::new();

        for item in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = item?;
            match branch.name()? {
                Some(name) => {
                    if let Ok(name) = BranchName::new(name) {
                        names.push(name);
                    }
                }
                None => warn!(
                    "Skipping branch with non UTF-8 name in {}",
                    self.workdir.display()
                ),
            }
        }

        names.sort();
        Ok(names)
    }

    fn modified_count(&self) -> Result<usize> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses
            .iter()
            .filter(|entry| {
                let status = entry.status();
                !status.is_empty() && !status.contains(Status::IGNORED)
            })
            .count())
    }

    fn has_local_branch(&self, name: &BranchName) -> Result<bool> {
        match self.repo.find_branch(name.as_str(), BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec) => {
                Ok(false)
            }
            Err(e) if e.class() == ErrorClass::Reference => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn switch_branch(
        &mut self,
        target: &BranchName,
        cancel: &CancellationToken,
    ) -> std::result::Result<(), CheckoutError> {
        let failed = |e: git2::Error| CheckoutError::Failed(e.message().to_string());

        let branch = self
            .repo
            .find_branch(target.as_str(), BranchType::Local)
            .map_err(|e| match e.code() {
                ErrorCode::NotFound => CheckoutError::BranchNotFound(target.to_string()),
                _ => failed(e),
            })?;
        let commit = branch.get().peel_to_commit().map_err(failed)?;

        if cancel.is_cancelled() {
            return Err(CheckoutError::Cancelled);
        }

        let token = cancel.clone();
        let mut builder = CheckoutBuilder::new();
        builder
            .safe()
            .notify_on(CheckoutNotificationType::UPDATED)
            .notify(move |_, _, _, _, _| !token.is_cancelled());

        if let Err(e) = self.repo.checkout_tree(commit.as_object(), Some(&mut builder)) {
            self.restore_head();
            if cancel.is_cancelled() {
                return Err(CheckoutError::Cancelled);
            }
            return Err(failed(e));
        }

        if cancel.is_cancelled() {
            self.restore_head();
            return Err(CheckoutError::Cancelled);
        }

        if let Err(e) = self.repo.set_head(&target.ref_name()) {
            self.restore_head();
            return Err(failed(e));
        }

        debug!(
            "HEAD of {} now at {} ({})",
            self.workdir.display(),
            target,
            commit.id()
        );
        Ok(())
    }
}
