// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod branch;
pub mod checkout;
pub mod report;
pub mod snapshot;

pub use branch::BranchName;
pub use checkout::CheckoutRequest;
pub use report::{DiscoveryReport, RepoEntry, RootReport};
pub use snapshot::RepoStatusSnapshot;
