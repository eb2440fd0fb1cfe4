//! Dashboard report rendering.
//!
//! Wraps a computed dashboard with metadata and renders it as Markdown or
//! JSON.

mod generator;

pub use generator::{generate_json_report, generate_markdown_report, write_report};

use crate::charts::Dashboard;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata about a rendered dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Dashboard title.
    pub title: String,
    /// Where the dataset was loaded from.
    pub data_source: String,
    /// Number of records in the loaded dataset.
    pub records_loaded: usize,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
}

/// A dashboard ready to be written out.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub metadata: ReportMetadata,
    pub dashboard: Dashboard,
}

impl DashboardReport {
    pub fn new(metadata: ReportMetadata, dashboard: Dashboard) -> Self {
        Self {
            metadata,
            dashboard,
        }
    }
}
