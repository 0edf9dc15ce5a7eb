// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: refresh orchestration

mod progress;
mod refresh;

pub use progress::{ProgressTracker, RefreshStats};
pub use refresh::RefreshCoordinator;
