// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod error;
pub mod exporter;
pub mod models;
pub mod pipeline;
pub mod repository;
pub mod utils;

pub use config::{Config, RefreshConfig};
pub use error::{CheckoutError, LocateError, MrgitError, RepoError, Result};
pub use exporter::{JsonExporter, TableRenderer};
pub use models::{
    BranchName, CheckoutRequest, DiscoveryReport, RepoEntry, RepoStatusSnapshot, RootReport,
};
pub use pipeline::{ProgressTracker, RefreshCoordinator, RefreshStats};
pub use repository::{
    GitWorkingCopy, LockRegistry, RepoLocator, RepoStatusService, RepositoryHandle, WorkingCopy,
    enumerate_candidates,
};
pub use utils::{LogSink, MemorySink, TracingSink};
