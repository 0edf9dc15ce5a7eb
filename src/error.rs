// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MrgitError>;

#[derive(Error, Debug)]
pub enum MrgitError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Repository at {path} is no longer accessible: {message}")]
    RepositoryAccess { path: PathBuf, message: String },

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
}

/// Failure while probing a candidate directory for a working copy.
///
/// "Not a repository" is not an error; it is reported as an absent result.
#[derive(Error, Debug)]
pub enum LocateError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Per-repository failure recorded in a refresh report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Repository is no longer accessible: {0}")]
    RepositoryAccess(String),

    #[error("Timed out after {0} seconds")]
    TimedOut(u64),
}

impl From<LocateError> for RepoError {
    fn from(err: LocateError) -> Self {
        RepoError::Io(err.to_string())
    }
}

impl From<MrgitError> for RepoError {
    fn from(err: MrgitError) -> Self {
        match err {
            MrgitError::Io(e) => RepoError::Io(e.to_string()),
            MrgitError::FileOperation { path, source } => {
                RepoError::Io(format!("{}: {}", path.display(), source))
            }
            MrgitError::RepositoryAccess { message, .. } => RepoError::RepositoryAccess(message),
            other => RepoError::RepositoryAccess(other.to_string()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Working tree has {0} modified file(s); commit or discard them before switching")]
    DirtyWorkingTree(usize),

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Invalid branch name: {0:?}")]
    InvalidBranchName(String),

    #[error("Checkout cancelled")]
    Cancelled,

    #[error("Repository handle from refresh cycle {handle_cycle} is stale (current cycle {current_cycle}); refresh first")]
    StaleHandle {
        handle_cycle: u64,
        current_cycle: u64,
    },

    #[error("Repository is no longer accessible: {0}")]
    RepositoryAccess(String),

    #[error("Checkout failed: {0}")]
    Failed(String),
}

impl From<MrgitError> for CheckoutError {
    fn from(err: MrgitError) -> Self {
        match err {
            MrgitError::RepositoryAccess { message, .. } => CheckoutError::RepositoryAccess(message),
            other => CheckoutError::Failed(other.to_string()),
        }
    }
}
