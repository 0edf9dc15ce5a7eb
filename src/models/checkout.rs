// file: src/models/checkout.rs
// description: one-shot branch switch command sent back to the core

use crate::models::BranchName;
use crate::repository::RepositoryHandle;

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub handle: RepositoryHandle,
    pub target: BranchName,
}

impl CheckoutRequest {
    pub fn new(handle: RepositoryHandle, target: BranchName) -> Self {
        Self { handle, target }
    }
}
