// file: src/models/report.rs
// description: result of one refresh cycle across all configured roots
// reference: internal data structures

use crate::error::RepoError;
use crate::models::RepoStatusSnapshot;
use crate::pipeline::RefreshStats;
use crate::repository::RepositoryHandle;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// One discovered working copy. `handle` is present whenever the directory
/// was located, even if the snapshot afterwards failed.
#[derive(Debug, Clone)]
pub struct RepoEntry {
    pub path: PathBuf,
    pub handle: Option<RepositoryHandle>,
    pub status: Result<RepoStatusSnapshot, RepoError>,
}

impl RepoEntry {
    pub fn name(&self) -> String {
        match &self.status {
            Ok(snapshot) => snapshot.name.clone(),
            Err(_) => self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.path.display().to_string()),
        }
    }

    pub fn snapshot(&self) -> Option<&RepoStatusSnapshot> {
        self.status.as_ref().ok()
    }
}

#[derive(Debug, Clone)]
pub struct RootReport {
    pub root: PathBuf,
    /// `Err` when the root itself could not be listed.
    pub entries: Result<Vec<RepoEntry>, RepoError>,
}

impl RootReport {
    pub fn snapshots(&self) -> Vec<&RepoStatusSnapshot> {
        match &self.entries {
            Ok(entries) => entries.iter().filter_map(RepoEntry::snapshot).collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveryReport {
    pub cycle: u64,
    pub generated_at: DateTime<Utc>,
    /// In the order the roots were supplied.
    pub roots: Vec<RootReport>,
    pub stats: RefreshStats,
}

impl DiscoveryReport {
    pub fn get(&self, root: &Path) -> Option<&RootReport> {
        self.roots.iter().find(|r| r.root == root)
    }

    pub fn entries(&self) -> impl Iterator<Item = &RepoEntry> {
        self.roots
            .iter()
            .filter_map(|r| r.entries.as_ref().ok())
            .flatten()
    }

    /// Matches a display name first, then an exact path.
    pub fn find(&self, query: &str) -> Option<&RepoEntry> {
        self.entries()
            .find(|e| e.name() == query)
            .or_else(|| self.entries().find(|e| e.path == Path::new(query)))
    }
}
