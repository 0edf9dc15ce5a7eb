// file: src/exporter/json.rs
// description: json export of a discovery report

use crate::error::{MrgitError, Result};
use crate::models::{DiscoveryReport, RepoStatusSnapshot};
use crate::pipeline::RefreshStats;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct JsonExporter {
    pretty: bool,
}

#[derive(Debug, Serialize)]
pub struct ExportedReport {
    pub exported_at: String,
    pub cycle: u64,
    pub stats: RefreshStats,
    pub roots: Vec<ExportedRoot>,
}

#[derive(Debug, Serialize)]
pub struct ExportedRoot {
    pub root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub repositories: Vec<ExportedRepository>,
}

#[derive(Debug, Serialize)]
pub struct ExportedRepository {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RepoStatusSnapshot>,
    pub switchable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JsonExporter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn build(&self, report: &DiscoveryReport) -> ExportedReport {
        let roots = report
            .roots
            .iter()
            .map(|root| {
                let (error, repositories) = match &root.entries {
                    Ok(entries) => (
                        None,
                        entries
                            .iter()
                            .map(|entry| ExportedRepository {
                                path: entry.path.display().to_string(),
                                status: entry.status.as_ref().ok().cloned(),
                                switchable: entry
                                    .snapshot()
                                    .map(RepoStatusSnapshot::is_switchable)
                                    .unwrap_or(false),
                                error: entry.status.as_ref().err().map(ToString::to_string),
                            })
                            .collect(),
                    ),
                    Err(e) => (Some(e.to_string()), Vec::new()),
                };

                ExportedRoot {
                    root: root.root.display().to_string(),
                    error,
                    repositories,
                }
            })
            .collect();

        ExportedReport {
            exported_at: report.generated_at.to_rfc3339(),
            cycle: report.cycle,
            stats: report.stats.clone(),
            roots,
        }
    }

    pub fn render(&self, report: &DiscoveryReport) -> Result<String> {
        let exported = self.build(report);
        let json = if self.pretty {
            serde_json::to_string_pretty(&exported)?
        } else {
            serde_json::to_string(&exported)?
        };
        Ok(json)
    }

    pub fn write(&self, report: &DiscoveryReport, path: &Path) -> Result<()> {
        let json = self.render(report)?;
        fs::write(path, json).map_err(|source| MrgitError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Report written to {}", path.display());
        Ok(())
    }
}
