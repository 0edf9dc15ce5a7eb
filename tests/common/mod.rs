// file: tests/common/mod.rs
// description: on-disk git fixtures shared by the integration tests

#![allow(dead_code)]

use git2::{Repository, RepositoryInitOptions, Signature};
use std::fs;
use std::path::Path;

pub fn init_repo(dir: &Path) -> Repository {
    fs::create_dir_all(dir).unwrap();
    let mut options = RepositoryInitOptions::new();
    options.initial_head("main");
    Repository::init_opts(dir, &options).unwrap()
}

pub fn commit_file(repo: &Repository, name: &str, content: &str) {
    let workdir = repo.workdir().unwrap().to_path_buf();
    fs::write(workdir.join(name), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let signature = Signature::now("Test", "test@example.com").unwrap();
    let parent = repo.head().ok().map(|h| h.peel_to_commit().unwrap());
    let parents: Vec<_> = parent.iter().collect();
    repo.commit(Some("HEAD"), &signature, &signature, name, &tree, &parents)
        .unwrap();
}

pub fn create_branch(repo: &Repository, name: &str) {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch(name, &head, false).unwrap();
}

pub fn switch(repo: &Repository, name: &str) {
    let refname = format!("refs/heads/{}", name);
    let target = repo.revparse_single(&refname).unwrap();
    repo.checkout_tree(&target, None).unwrap();
    repo.set_head(&refname).unwrap();
}

/// Clean repository on `main` with a `dev` branch that adds `dev.txt`.
pub fn clean_repo(dir: &Path) -> Repository {
    let repo = init_repo(dir);
    commit_file(&repo, "README.md", "# project");
    create_branch(&repo, "dev");
    switch(&repo, "dev");
    commit_file(&repo, "dev.txt", "dev only");
    switch(&repo, "main");
    repo
}

/// Repository on `main` with `count` modified tracked files and one untracked file.
pub fn dirty_repo(dir: &Path, count: usize) -> Repository {
    let repo = init_repo(dir);
    commit_file(&repo, "README.md", "# project");
    for i in 0..count {
        commit_file(&repo, &format!("file{}.txt", i), "original");
    }
    create_branch(&repo, "dev");
    for i in 0..count {
        fs::write(dir.join(format!("file{}.txt", i)), "changed").unwrap();
    }
    fs::write(dir.join("scratch.txt"), "untracked").unwrap();
    repo
}

/// Clean repository on `main` whose `dev` branch adds `count` files in one commit.
pub fn wide_repo(dir: &Path, count: usize) -> Repository {
    let repo = init_repo(dir);
    commit_file(&repo, "README.md", "# project");
    create_branch(&repo, "dev");
    switch(&repo, "dev");

    let mut index = repo.index().unwrap();
    for i in 0..count {
        let name = format!("gen/file{:04}.txt", i);
        fs::create_dir_all(dir.join("gen")).unwrap();
        fs::write(dir.join(&name), format!("generated {}", i)).unwrap();
        index.add_path(Path::new(&name)).unwrap();
    }
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let signature = Signature::now("Test", "test@example.com").unwrap();
    let parent = repo.head().unwrap().peel_to_commit().unwrap();
    repo.commit(Some("HEAD"), &signature, &signature, "generated", &tree, &[&parent])
        .unwrap();
    drop(parent);
    drop(tree);

    switch(&repo, "main");
    repo
}
