// file: src/repository/scanner.rs
// description: lists the candidate directories directly below a root
// reference: https://docs.rs/walkdir

use crate::error::{MrgitError, Result};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Immediate child directories of `root`, sorted by name.
///
/// Symlinks to directories are followed, plain files are skipped. An
/// unreadable root is an error; an unreadable child is skipped.
pub fn enumerate_candidates(root: &Path) -> Result<Vec<PathBuf>> {
    info!("Scanning root: {}", root.display());

    if !root.is_dir() {
        return Err(MrgitError::FileOperation {
            path: root.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let mut candidates = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                let path = err.path().unwrap_or(root).to_path_buf();
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("directory loop"));
                return Err(MrgitError::FileOperation { path, source });
            }
            Err(err) => {
                debug!("Skipping unreadable entry: {}", err);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            candidates.push(entry.into_path());
        }
    }

    debug!("{} candidate directories under {}", candidates.len(), root.display());
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lists_only_child_directories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("b")).unwrap();
        fs::create_dir(temp.path().join("a")).unwrap();
        fs::create_dir_all(temp.path().join("a").join("nested")).unwrap();
        fs::write(temp.path().join("notes.txt"), "x").unwrap();

        let candidates = enumerate_candidates(temp.path()).unwrap();

        assert_eq!(
            candidates,
            vec![temp.path().join("a"), temp.path().join("b")]
        );
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");

        assert!(matches!(
            enumerate_candidates(&missing),
            Err(MrgitError::FileOperation { .. })
        ));
    }
}
