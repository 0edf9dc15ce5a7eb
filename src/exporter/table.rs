// file: src/exporter/table.rs
// description: plain terminal table of a discovery report

use crate::models::{DiscoveryReport, RepoEntry};
use colored::Colorize;

const HEADERS: [&str; 4] = ["repository", "current branch", "branches", "mod. files"];

/// Renders one block per root. Rows with modified files are bold and
/// marked as locked, since their branch cannot be switched.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableRenderer;

impl TableRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, report: &DiscoveryReport) -> String {
        let mut out = String::new();

        for root in &report.roots {
            out.push_str(&format!("{}\n", root.root.display().to_string().cyan().bold()));

            let entries = match &root.entries {
                Ok(entries) => entries,
                Err(e) => {
                    out.push_str(&format!("  {}\n", format!("✗ {}", e).red()));
                    continue;
                }
            };

            if entries.is_empty() {
                out.push_str("  (no repositories)\n");
                continue;
            }

            let rows: Vec<[String; 4]> = entries.iter().map(row).collect();
            let mut widths = HEADERS.map(str::len);
            for cells in &rows {
                for (width, cell) in widths.iter_mut().zip(cells) {
                    *width = (*width).max(cell.chars().count());
                }
            }

            out.push_str(&format!(
                "  {}\n",
                pad_row(&HEADERS.map(String::from), &widths).dimmed()
            ));

            for (entry, cells) in entries.iter().zip(&rows) {
                let line = pad_row(cells, &widths);
                let line = match &entry.status {
                    Ok(snapshot) if snapshot.is_dirty() => format!("{}  locked", line.bold()),
                    Ok(_) => line,
                    Err(_) => line.red().to_string(),
                };
                out.push_str(&format!("  {}\n", line));
            }
        }

        out
    }
}

fn row(entry: &RepoEntry) -> [String; 4] {
    match &entry.status {
        Ok(snapshot) => [
            snapshot.name.clone(),
            snapshot
                .current_branch
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "(detached)".to_string()),
            snapshot
                .branches
                .iter()
                .map(|b| b.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            snapshot.modified_count.to_string(),
        ],
        Err(e) => [entry.name(), "-".to_string(), e.to_string(), "-".to_string()],
    }
}

fn pad_row(cells: &[String; 4], widths: &[usize; 4]) -> String {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        // modification counts are right aligned
        if i == 3 {
            line.push_str(&format!("{:>width$}", cell, width = width));
        } else {
            line.push_str(&format!("{:<width$}", cell, width = width));
        }
    }
    line.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoError;
    use crate::models::{BranchName, RepoStatusSnapshot, RootReport};
    use crate::pipeline::RefreshStats;
    use chrono::Utc;
    use std::path::PathBuf;

    fn entry(name: &str, current: Option<&str>, modified_count: usize) -> RepoEntry {
        RepoEntry {
            path: PathBuf::from("/srv/git").join(name),
            handle: None,
            status: Ok(RepoStatusSnapshot {
                name: name.to_string(),
                current_branch: current.map(|b| BranchName::new(b).unwrap()),
                branches: vec![
                    BranchName::new("dev").unwrap(),
                    BranchName::new("main").unwrap(),
                ],
                modified_count,
            }),
        }
    }

    #[test]
    fn test_render_rows() {
        colored::control::set_override(false);

        let report = DiscoveryReport {
            cycle: 1,
            generated_at: Utc::now(),
            roots: vec![
                RootReport {
                    root: PathBuf::from("/srv/git"),
                    entries: Ok(vec![
                        entry("repoA", Some("main"), 0),
                        entry("repoB", None, 2),
                        RepoEntry {
                            path: PathBuf::from("/srv/git/gone"),
                            handle: None,
                            status: Err(RepoError::RepositoryAccess("deleted".to_string())),
                        },
                    ]),
                },
                RootReport {
                    root: PathBuf::from("/empty"),
                    entries: Ok(vec![]),
                },
            ],
            stats: RefreshStats::new(),
        };

        let rendered = TableRenderer::new().render(&report);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "/srv/git");
        assert!(lines[1].contains("current branch"));
        assert!(lines[2].starts_with("  repoA"));
        assert!(lines[2].contains("dev, main"));
        assert!(lines[2].ends_with('0'));
        assert!(lines[3].contains("(detached)"));
        assert!(lines[3].ends_with("locked"));
        assert!(lines[4].contains("deleted"));
        assert_eq!(lines[5], "/empty");
        assert_eq!(lines[6], "  (no repositories)");
    }
}
