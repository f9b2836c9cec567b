//! Explicit run configuration.
//!
//! Stored as a plain JSON object on disk:
//! ```json
//! {
//!   "input": "github/merged_prs_2024-10-13_to_2024-10-27.csv",
//!   "output_dir": "reports",
//!   "reports": ["fast_slow", "daily", "weekly"],
//!   "formats": ["json", "csv"],
//!   "s3_bucket": "release-reports",
//!   "gzip": true
//! }
//! ```
//! Only `input` is required.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::analyzers::types::ReportKind;
use crate::error::Result;
use crate::output::{OutputFormat, ReportSink};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Local path or HTTP(S) URL of the exported CSV.
    pub input: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_reports")]
    pub reports: Vec<ReportKind>,
    #[serde(default = "default_formats")]
    pub formats: Vec<OutputFormat>,
    #[serde(default)]
    pub s3_bucket: Option<String>,
    #[serde(default)]
    pub gzip: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_reports() -> Vec<ReportKind> {
    ReportKind::ALL.to_vec()
}

fn default_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::Json]
}

impl ReportConfig {
    /// All reports, JSON output under `reports/`, no upload.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output_dir: default_output_dir(),
            reports: default_reports(),
            formats: default_formats(),
            s3_bucket: None,
            gzip: false,
        }
    }

    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ReportConfig = serde_json::from_str(&content)?;
        Ok(config.deduplicated())
    }

    pub fn with_reports(mut self, reports: impl IntoIterator<Item = ReportKind>) -> Self {
        self.reports = reports.into_iter().collect();
        self.deduplicated()
    }

    pub fn with_formats(mut self, formats: impl IntoIterator<Item = OutputFormat>) -> Self {
        self.formats = formats.into_iter().collect();
        self.deduplicated()
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// `<output_dir>/<folder>/<stem>.<ext>` for one report and format.
    pub fn artifact_path(&self, kind: ReportKind, format: OutputFormat) -> PathBuf {
        self.output_dir
            .join(kind.folder())
            .join(format!("{}.{}", kind.file_stem(), format.extension()))
    }

    pub fn sinks_for(&self, kind: ReportKind) -> Vec<Box<dyn ReportSink>> {
        self.formats
            .iter()
            .map(|format| format.sink(self.artifact_path(kind, *format)))
            .collect()
    }

    fn deduplicated(mut self) -> Self {
        dedup_in_order(&mut self.reports);
        dedup_in_order(&mut self.formats);
        self
    }
}

fn dedup_in_order<T: PartialEq>(items: &mut Vec<T>) {
    let mut seen: Vec<T> = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    *items = seen;
}
