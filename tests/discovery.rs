// file: tests/discovery.rs
// description: refresh cycles across root directories

mod common;

use mrgit::{RefreshCoordinator, RefreshConfig, RepoError, RepoLocator, TracingSink};
use pretty_assertions::assert_eq;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn coordinator() -> RefreshCoordinator {
    RefreshCoordinator::new(RefreshConfig::default(), Arc::new(TracingSink))
}

#[tokio::test]
async fn test_discover_reports_repositories_only() {
    let root = TempDir::new().unwrap();
    common::clean_repo(&root.path().join("repoA"));
    common::dirty_repo(&root.path().join("repoB"), 2);
    fs::create_dir(root.path().join("not-a-repo")).unwrap();
    fs::write(root.path().join("notes.txt"), "ignored").unwrap();

    let report = coordinator().discover(&[root.path().to_path_buf()]).await;

    let root_report = report.get(root.path()).unwrap();
    let snapshots = root_report.snapshots();
    let names: Vec<&str> = snapshots.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["repoA", "repoB"]);

    let repo_a = snapshots[0];
    assert!(repo_a.has_branch("main"));
    assert!(repo_a.has_branch("dev"));
    assert_eq!(repo_a.current_branch.as_ref().unwrap(), "main");
    assert_eq!(repo_a.modified_count, 0);

    let repo_b = snapshots[1];
    assert_eq!(repo_b.modified_count, 2);
    assert!(!repo_b.is_switchable());

    assert_eq!(report.stats.repositories, 2);
    assert_eq!(report.stats.skipped, 1);
    assert_eq!(report.stats.candidates, 3);
}

#[tokio::test]
async fn test_unreadable_root_does_not_abort_refresh() {
    let good = TempDir::new().unwrap();
    common::clean_repo(&good.path().join("repoA"));
    let missing = good.path().join("missing-root");

    let report = coordinator()
        .discover(&[missing.clone(), good.path().to_path_buf()])
        .await;

    assert_eq!(report.roots.len(), 2);
    assert!(matches!(
        report.get(&missing).unwrap().entries,
        Err(RepoError::Io(_))
    ));
    assert_eq!(report.get(good.path()).unwrap().snapshots().len(), 1);
}

#[tokio::test]
async fn test_deleted_repository_reported_alongside_others() {
    let root = TempDir::new().unwrap();
    common::clean_repo(&root.path().join("repoA"));
    common::clean_repo(&root.path().join("repoC"));
    let coordinator = coordinator();

    let report = coordinator.discover(&[root.path().to_path_buf()]).await;
    let handle = report.find("repoC").unwrap().handle.clone().unwrap();

    fs::remove_dir_all(root.path().join("repoC")).unwrap();
    let result = coordinator.service().snapshot(&handle).await;
    assert!(result.is_err());

    let report = coordinator.discover(&[root.path().to_path_buf()]).await;
    assert_eq!(report.get(root.path()).unwrap().snapshots().len(), 1);
}

#[tokio::test]
async fn test_snapshot_is_idempotent() {
    let root = TempDir::new().unwrap();
    common::dirty_repo(&root.path().join("repoB"), 2);
    let coordinator = coordinator();

    let report = coordinator.discover(&[root.path().to_path_buf()]).await;
    let handle = report.find("repoB").unwrap().handle.clone().unwrap();

    let first = coordinator.service().snapshot(&handle).await.unwrap();
    let second = coordinator.service().snapshot(&handle).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_parallel_snapshots_do_not_interfere() {
    let root = TempDir::new().unwrap();
    for i in 0..8 {
        let dir = root.path().join(format!("repo{}", i));
        common::dirty_repo(&dir, i % 3);
    }
    let config = RefreshConfig {
        parallel_workers: 3,
        ..RefreshConfig::default()
    };
    let coordinator = RefreshCoordinator::new(config, Arc::new(TracingSink));

    let report = coordinator.discover(&[root.path().to_path_buf()]).await;

    let snapshots = report.get(root.path()).unwrap().snapshots();
    assert_eq!(snapshots.len(), 8);
    for (i, snapshot) in snapshots.iter().enumerate() {
        assert_eq!(snapshot.name, format!("repo{}", i));
        assert_eq!(snapshot.modified_count, i % 3);
    }
}

#[test]
fn test_locate_plain_directories_never_fails() {
    let root = TempDir::new().unwrap();
    let locator = RepoLocator::new();

    for name in ["a", "b", "with space", ".hidden"] {
        let dir = root.path().join(name);
        fs::create_dir(&dir).unwrap();
        assert!(locator.locate(&dir).unwrap().is_none());
    }
}
