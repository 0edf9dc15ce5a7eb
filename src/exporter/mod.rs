// file: src/exporter/mod.rs
// description: report rendering module exports
// reference: internal module structure

pub mod json;
pub mod table;

pub use json::{ExportedReport, JsonExporter};
pub use table::TableRenderer;
