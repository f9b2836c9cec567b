//! Report handoff to the rendering layer.
//!
//! A [`ReportSink`] receives a finished [`ReportArtifact`] and persists it
//! where a chart renderer can pick it up. Two sinks ship here: pretty JSON of
//! the whole artifact, and a flat CSV of the ordered series.

use csv::WriterBuilder;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analyzers::types::ReportArtifact;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }

    pub fn sink(&self, path: PathBuf) -> Box<dyn ReportSink> {
        match self {
            OutputFormat::Json => Box::new(JsonFileSink::new(path)),
            OutputFormat::Csv => Box::new(CsvSeriesSink::new(path)),
        }
    }
}

/// Destination for a finished report.
pub trait ReportSink {
    /// Persists `artifact` and returns where it was written.
    fn deliver(&self, artifact: &ReportArtifact) -> Result<PathBuf>;
}

pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for JsonFileSink {
    fn deliver(&self, artifact: &ReportArtifact) -> Result<PathBuf> {
        ensure_parent(&self.path)?;
        let mut json = to_json(artifact)?;
        json.push('\n');
        fs::write(&self.path, json)?;
        Ok(self.path.clone())
    }
}

/// Writes the series as `key,label,count` rows, replacing any previous file.
pub struct CsvSeriesSink {
    path: PathBuf,
}

impl CsvSeriesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for CsvSeriesSink {
    fn deliver(&self, artifact: &ReportArtifact) -> Result<PathBuf> {
        ensure_parent(&self.path)?;

        let mut writer = WriterBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        for row in artifact.report.series_rows() {
            writer.serialize(row)?;
        }
        writer.flush()?;

        Ok(self.path.clone())
    }
}

/// Hands `artifact` to every sink in order. Stops at the first failure.
pub fn handoff(artifact: &ReportArtifact, sinks: &[Box<dyn ReportSink>]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(sinks.len());
    for sink in sinks {
        let path = sink.deliver(artifact)?;
        info!(report = %artifact.kind, path = %path.display(), "Report saved");
        paths.push(path);
    }
    Ok(paths)
}

pub fn to_json(artifact: &ReportArtifact) -> Result<String> {
    Ok(serde_json::to_string_pretty(artifact)?)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
