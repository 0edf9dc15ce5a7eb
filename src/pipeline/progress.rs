// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for a refresh
// reference: uses indicatif for progress bars and tracks refresh counters

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshStats {
    pub roots: usize,
    pub candidates: usize,
    pub repositories: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
}

impl RefreshStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories_per_second(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.repositories + self.failed) as f64 * 1000.0 / self.duration_ms as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.repositories + self.failed;
        if total == 0 {
            return 0.0;
        }
        (self.repositories as f64 / total as f64) * 100.0
    }
}

pub struct ProgressTracker {
    bar: ProgressBar,
    roots: usize,
    candidates: usize,
    repositories: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(roots: usize, candidates: usize, visible: bool) -> Self {
        let bar = if visible {
            create_progress_bar(candidates as u64)
        } else {
            ProgressBar::hidden()
        };

        Self {
            bar,
            roots,
            candidates,
            repositories: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn inc_repositories(&self, name: &str) {
        self.repositories.fetch_add(1, Ordering::SeqCst);
        self.bar.set_message(name.to_string());
        self.bar.inc(1);
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
        self.bar.inc(1);
    }

    pub fn inc_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> RefreshStats {
        RefreshStats {
            roots: self.roots,
            candidates: self.candidates,
            repositories: self.repositories.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            skipped: self.skipped.load(Ordering::SeqCst),
            duration_ms: self.start_time.elapsed().as_millis() as u64,
        }
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    match ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        Ok(style) => bar.set_style(style.progress_chars("█▓▒░")),
        Err(e) => tracing::debug!("Falling back to default progress style: {}", e),
    }
    bar
}
