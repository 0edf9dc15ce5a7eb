// file: src/pipeline/refresh.rs
// description: coordinates discovery and status snapshots across all roots
// reference: bounded concurrent fan-out with buffer_unordered over blocking tasks

use crate::config::RefreshConfig;
use crate::error::{CheckoutError, RepoError};
use crate::models::{BranchName, CheckoutRequest, DiscoveryReport, RepoEntry, RootReport};
use crate::pipeline::progress::{ProgressTracker, RefreshStats};
use crate::repository::{LockRegistry, RepoLocator, RepoStatusService, enumerate_candidates};
use crate::utils::logging::{LogSink, TracingSink};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Entry point for the presentation layer: one call per refresh, one call
/// per branch switch.
pub struct RefreshCoordinator {
    config: RefreshConfig,
    service: Arc<RepoStatusService>,
    locks: LockRegistry,
    cycle: AtomicU64,
    show_progress: bool,
}

enum Probe {
    NotARepository,
    Found(RepoEntry),
}

impl RefreshCoordinator {
    pub fn new(config: RefreshConfig, sink: Arc<dyn LogSink>) -> Self {
        Self {
            config,
            service: Arc::new(RepoStatusService::new(sink)),
            locks: LockRegistry::new(),
            cycle: AtomicU64::new(0),
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn service(&self) -> &RepoStatusService {
        &self.service
    }

    pub fn current_cycle(&self) -> u64 {
        self.cycle.load(Ordering::SeqCst)
    }

    /// Runs one refresh cycle over the immediate children of every root.
    ///
    /// Handles from earlier cycles become stale once this returns. Failures
    /// are recorded per root or per repository and never abort the refresh.
    pub async fn discover(&self, roots: &[PathBuf]) -> DiscoveryReport {
        let cycle = self.cycle.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Refreshing {} root(s), cycle {}", roots.len(), cycle);

        let mut listings = Vec::with_capacity(roots.len());
        for root in roots {
            let dir = root.clone();
            let listing = match tokio::task::spawn_blocking(move || enumerate_candidates(&dir))
                .await
            {
                Ok(Ok(candidates)) => Ok(candidates),
                Ok(Err(e)) => {
                    warn!("Cannot list root {}: {}", root.display(), e);
                    Err(RepoError::from(e))
                }
                Err(e) => Err(RepoError::Io(e.to_string())),
            };
            listings.push(listing);
        }

        let jobs: Vec<(usize, PathBuf)> = listings
            .iter()
            .enumerate()
            .filter_map(|(index, listing)| listing.as_ref().ok().map(|c| (index, c)))
            .flat_map(|(index, candidates)| candidates.iter().map(move |c| (index, c.clone())))
            .collect();

        let progress = Arc::new(ProgressTracker::new(
            roots.len(),
            jobs.len(),
            self.show_progress,
        ));
        let locator = RepoLocator::for_cycle(cycle).with_locks(self.locks.clone());
        let timeout = self.config.repo_timeout();
        let timeout_secs = self.config.repo_timeout_secs;

        let probes = stream::iter(jobs.into_iter().map(|(index, candidate)| {
            let locator = locator.clone();
            let service = Arc::clone(&self.service);
            let progress = Arc::clone(&progress);

            async move {
                let outcome = tokio::time::timeout(
                    timeout,
                    probe(locator, service, candidate.clone()),
                )
                .await
                .unwrap_or_else(|_| {
                    warn!("Timed out probing {}", candidate.display());
                    Probe::Found(RepoEntry {
                        path: candidate.clone(),
                        handle: None,
                        status: Err(RepoError::TimedOut(timeout_secs)),
                    })
                });

                match &outcome {
                    Probe::NotARepository => progress.inc_skipped(),
                    Probe::Found(entry) if entry.status.is_ok() => {
                        progress.inc_repositories(&entry.name())
                    }
                    Probe::Found(_) => progress.inc_failed(),
                }

                (index, outcome)
            }
        }))
        .buffer_unordered(self.config.parallel_workers.max(1))
        .collect::<Vec<_>>()
        .await;

        let mut grouped: Vec<Vec<RepoEntry>> = vec![Vec::new(); roots.len()];
        for (index, outcome) in probes {
            if let Probe::Found(entry) = outcome {
                grouped[index].push(entry);
            }
        }

        let reports = roots
            .iter()
            .zip(listings)
            .zip(grouped)
            .map(|((root, listing), mut entries)| {
                entries.sort_by(|a, b| a.path.cmp(&b.path));
                RootReport {
                    root: root.clone(),
                    entries: listing.map(|_| entries),
                }
            })
            .collect();

        let stats = progress.get_stats();
        progress.finish();
        log_stats(&stats);

        DiscoveryReport {
            cycle,
            generated_at: Utc::now(),
            roots: reports,
            stats,
        }
    }

    /// Sends a branch switch for a handle from the latest refresh cycle.
    pub async fn request_checkout(
        &self,
        request: CheckoutRequest,
        cancel: &CancellationToken,
    ) -> Result<BranchName, CheckoutError> {
        let current_cycle = self.current_cycle();
        if request.handle.cycle() != current_cycle {
            return Err(CheckoutError::StaleHandle {
                handle_cycle: request.handle.cycle(),
                current_cycle,
            });
        }

        self.service
            .checkout(
                &request.handle,
                &request.target,
                cancel,
                self.config.checkout_timeout(),
            )
            .await
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new(RefreshConfig::default(), Arc::new(TracingSink))
    }
}

async fn probe(locator: RepoLocator, service: Arc<RepoStatusService>, candidate: PathBuf) -> Probe {
    let dir = candidate.clone();
    let located = tokio::task::spawn_blocking(move || locator.locate(&dir)).await;

    let handle = match located {
        Ok(Ok(Some(handle))) => handle,
        Ok(Ok(None)) => return Probe::NotARepository,
        Ok(Err(e)) => {
            warn!("{}", e);
            return Probe::Found(RepoEntry {
                path: candidate,
                handle: None,
                status: Err(e.into()),
            });
        }
        Err(e) => {
            return Probe::Found(RepoEntry {
                path: candidate,
                handle: None,
                status: Err(RepoError::Io(e.to_string())),
            });
        }
    };

    let status = service.snapshot(&handle).await.map_err(|e| {
        warn!("Cannot read status of {}: {}", candidate.display(), e);
        RepoError::from(e)
    });
    debug!("Probed {}", candidate.display());

    Probe::Found(RepoEntry {
        path: candidate,
        handle: Some(handle),
        status,
    })
}

fn log_stats(stats: &RefreshStats) {
    info!(
        "Refresh complete in {} ms: {} repositories, {} failed, {} skipped",
        stats.duration_ms, stats.repositories, stats.failed, stats.skipped
    );
    info!(
        "Probe rate: {:.2} repositories/sec, success rate: {:.1}%",
        stats.repositories_per_second(),
        stats.success_rate()
    );
}
