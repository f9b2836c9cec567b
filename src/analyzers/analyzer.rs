use std::path::PathBuf;
use tracing::info;

use crate::analyzers::aggregate::{aggregate_daily, aggregate_fast_slow, aggregate_weekly};
use crate::analyzers::classify::{classify_by, release_day, release_speed, release_week};
use crate::analyzers::normalize::normalize;
use crate::analyzers::types::{Diagnostic, Report, ReportArtifact, ReportKind, ReportOutcome};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::output::handoff;
use crate::parser::{Batch, parse_records};

const SCHEMA_VERSION: u8 = 1;
const ALGORITHM_VERSION: u8 = 1;

/// Result of running one report kind over a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub kind: ReportKind,
    /// Production records that passed the branch filter.
    pub admitted: usize,
    pub outcome: ReportOutcome<Report>,
    /// Rejected rows from ingestion followed by records this report skipped.
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    /// Packages a ready report for the renderer. `None` for an empty outcome.
    pub fn into_artifact(self) -> Option<ReportArtifact> {
        let report = self.outcome.ready()?;
        Some(ReportArtifact {
            schema_version: SCHEMA_VERSION,
            algorithm_version: ALGORITHM_VERSION,
            kind: self.kind,
            labels: self.kind.labels(),
            report,
            diagnostics: self.diagnostics,
        })
    }
}

/// Files written for one report.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub kind: ReportKind,
    pub paths: Vec<PathBuf>,
}

/// Normalizes, classifies and aggregates `batch` for a single report kind.
#[tracing::instrument(skip(batch), fields(records = batch.records.len()))]
pub fn analyze(batch: &Batch, kind: ReportKind) -> Analysis {
    let admitted = normalize(&batch.records);

    let (outcome, skipped) = match kind {
        ReportKind::FastSlow => {
            let classified = classify_by(&admitted, |r| Ok(release_speed(r)));
            (
                aggregate_fast_slow(&classified.bucket).map(Report::FastSlow),
                classified.diagnostics,
            )
        }
        ReportKind::Daily => {
            let classified = classify_by(&admitted, release_day);
            (
                aggregate_daily(&classified.bucket).map(Report::Daily),
                classified.diagnostics,
            )
        }
        ReportKind::Weekly => {
            let classified = classify_by(&admitted, release_week);
            (
                aggregate_weekly(&classified.bucket).map(Report::Weekly),
                classified.diagnostics,
            )
        }
    };

    let mut diagnostics = batch.rejected.clone();
    diagnostics.extend(skipped);

    Analysis {
        kind,
        admitted: admitted.len(),
        outcome,
        diagnostics,
    }
}

/// Runs every configured report over one CSV batch and hands each ready
/// report to the configured sinks.
///
/// Reports without data are logged and skipped; they are not errors.
///
/// # Errors
///
/// Returns an error if the batch cannot be ingested or a sink fails.
#[tracing::instrument(skip(config, bytes), fields(bytes = bytes.len()))]
pub fn run(config: &ReportConfig, bytes: &[u8]) -> Result<Vec<Delivery>> {
    let batch = parse_records(bytes)?;
    info!(
        records = batch.records.len(),
        rejected = batch.rejected.len(),
        "Batch ingested"
    );

    let mut deliveries = Vec::new();

    for &kind in &config.reports {
        let analysis = analyze(&batch, kind);
        let admitted = analysis.admitted;

        let Some(artifact) = analysis.into_artifact() else {
            info!(report = %kind, admitted, "No production releases found in the input");
            continue;
        };

        let paths = handoff(&artifact, &config.sinks_for(kind))?;
        deliveries.push(Delivery { kind, paths });
    }

    Ok(deliveries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::RawRecord;
    use crate::output::OutputFormat;
    use std::fs;
    use tempfile::TempDir;

    fn batch(records: Vec<RawRecord>) -> Batch {
        Batch {
            records,
            rejected: vec![],
        }
    }

    fn sample() -> Batch {
        batch(vec![
            RawRecord::new("prod", "fast", "2024-10-14T09:00:00Z").at_line(2),
            RawRecord::new("master", "slow", "2024-10-14T11:00:00Z").at_line(3),
            RawRecord::new("staging", "fast", "2024-10-15T09:00:00Z").at_line(4),
            RawRecord::new("prod", "fast", "not-a-date").at_line(5),
            RawRecord::new("prod", "hotfix", "2024-10-17T16:45:00Z").at_line(6),
        ])
    }

    #[test]
    fn test_fast_slow_counts_every_admitted_record() {
        let analysis = analyze(&sample(), ReportKind::FastSlow);

        assert_eq!(analysis.admitted, 4);
        assert!(analysis.diagnostics.is_empty());
        let Some(Report::FastSlow(report)) = analysis.outcome.ready() else {
            panic!("expected fast/slow report");
        };
        assert_eq!(report.fast + report.slow, 4);
        assert_eq!(report.fast, 2);
        assert!((report.share.fast_pct + report.share.slow_pct - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_daily_skips_bad_timestamp_with_diagnostic() {
        let analysis = analyze(&sample(), ReportKind::Daily);

        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(analysis.diagnostics[0].line, 5);
        let Some(Report::Daily(report)) = analysis.outcome.ready() else {
            panic!("expected daily report");
        };
        let counts: Vec<_> = report.series.iter().map(|d| d.count).collect();
        assert_eq!(counts, vec![2, 0, 0, 1]);
    }

    #[test]
    fn test_weekly_skips_bad_timestamp() {
        let analysis = analyze(&sample(), ReportKind::Weekly);

        assert_eq!(analysis.diagnostics.len(), 1);
        let Some(Report::Weekly(report)) = analysis.outcome.ready() else {
            panic!("expected weekly report");
        };
        assert_eq!(report.series.len(), 1);
        assert_eq!(report.series[0].count, 3);
    }

    #[test]
    fn test_staging_only_is_empty_everywhere() {
        let only_staging = batch(vec![RawRecord::new(
            "staging",
            "fast",
            "2024-10-14T09:00:00Z",
        )]);

        for kind in ReportKind::ALL {
            let analysis = analyze(&only_staging, kind);
            assert_eq!(analysis.admitted, 0);
            assert!(analysis.outcome.is_empty(), "{kind} should be empty");
        }
    }

    #[test]
    fn test_ingest_rejections_carried_into_diagnostics() {
        let mut input = sample();
        input.rejected.push(Diagnostic {
            line: 9,
            value: "prod,fast".to_string(),
            reason: "short row".to_string(),
        });

        let analysis = analyze(&input, ReportKind::FastSlow);
        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(analysis.diagnostics[0].line, 9);
    }

    #[test]
    fn test_into_artifact_empty_is_none() {
        let analysis = analyze(&batch(vec![]), ReportKind::Daily);
        assert!(analysis.into_artifact().is_none());
    }

    #[test]
    fn test_run_writes_configured_artifacts() {
        let dir = TempDir::new().unwrap();
        let config = ReportConfig::new("unused")
            .with_output_dir(dir.path())
            .with_formats([OutputFormat::Json, OutputFormat::Csv]);
        let csv = "Branch,Release Type,Merged At\n\
                   prod,fast,2024-10-14T09:00:00Z\n\
                   master,slow,2024-10-16T09:00:00Z\n";

        let deliveries = run(&config, csv.as_bytes()).unwrap();

        assert_eq!(deliveries.len(), 3);
        for delivery in &deliveries {
            assert_eq!(delivery.paths.len(), 2);
            assert!(delivery.paths.iter().all(|p| p.exists()));
        }
        assert!(dir.path().join("daily_report/releases_per_day.json").exists());
    }

    #[test]
    fn test_run_without_prod_releases_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = ReportConfig::new("unused").with_output_dir(dir.path());
        let csv = "Branch,Release Type,Merged At\nstaging,fast,2024-10-14T09:00:00Z\n";

        let deliveries = run(&config, csv.as_bytes()).unwrap();

        assert!(deliveries.is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_run_missing_column_fails() {
        let dir = TempDir::new().unwrap();
        let config = ReportConfig::new("unused").with_output_dir(dir.path());

        assert!(run(&config, b"Branch,Merged At\nprod,2024-10-14T09:00:00Z\n").is_err());
    }
}
