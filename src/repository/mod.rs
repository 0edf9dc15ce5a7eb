// file: src/repository/mod.rs
// description: Repository operations module exports
// reference: Internal module structure

pub mod backend;
pub mod git;
pub mod handle;
pub mod locator;
pub mod scanner;
pub mod status;

pub use backend::WorkingCopy;
pub use git::GitWorkingCopy;
pub use handle::{LockRegistry, RepositoryHandle};
pub use locator::RepoLocator;
pub use scanner::enumerate_candidates;
pub use status::RepoStatusService;
