//! CLI entry point for the release cadence reporter.
//!
//! Reads an exported pull-request CSV, builds the fast/slow, daily and
//! weekly release reports, and optionally uploads the artifacts to S3.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use release_cadence::analyzers::analyzer::run;
use release_cadence::analyzers::types::ReportKind;
use release_cadence::config::ReportConfig;
use release_cadence::fetch::load_input;
use release_cadence::output::OutputFormat;
use release_cadence::writetos3::upload_artifacts;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "release_cadence")]
#[command(about = "Release cadence reports from exported pull-request data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build one report, or all of them, from a CSV file or URL
    Report {
        /// Which report to build
        #[arg(value_enum)]
        kind: KindSelector,

        /// Path to the exported CSV, or a URL to fetch it from
        #[arg(short, long, value_name = "FILE_OR_URL")]
        input: String,

        /// Directory that receives the report folders
        #[arg(short, long, default_value = "reports")]
        output_dir: PathBuf,

        /// Artifact formats to write (repeatable)
        #[arg(short, long, value_enum, default_value = "json")]
        format: Vec<OutputFormat>,

        /// Optional: S3 bucket to upload the artifacts to
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Optional: Gzip compress artifacts before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Build the reports described by a JSON config file
    Run {
        /// Path to the config file
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindSelector {
    FastSlow,
    Daily,
    Weekly,
    All,
}

impl KindSelector {
    fn kinds(self) -> Vec<ReportKind> {
        match self {
            KindSelector::FastSlow => vec![ReportKind::FastSlow],
            KindSelector::Daily => vec![ReportKind::Daily],
            KindSelector::Weekly => vec![ReportKind::Weekly],
            KindSelector::All => ReportKind::ALL.to_vec(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_logging()?;

    let cli = Cli::parse();

    let config = match cli.command {
        Commands::Report {
            kind,
            input,
            output_dir,
            format,
            s3_bucket,
            gzip,
        } => {
            let mut config = ReportConfig::new(input)
                .with_reports(kind.kinds())
                .with_formats(format)
                .with_output_dir(output_dir);
            config.s3_bucket = s3_bucket;
            config.gzip = gzip;
            config
        }
        Commands::Run { config } => ReportConfig::load(&config)
            .with_context(|| format!("failed to load config {}", config.display()))?,
    };

    execute(&config).await
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_logging() -> Result<WorkerGuard> {
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/release_cadence.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("release_cadence.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

/// Loads the batch, builds every configured report, and uploads the
/// written artifacts when a bucket is configured.
#[tracing::instrument(skip(config), fields(input = %config.input))]
async fn execute(config: &ReportConfig) -> Result<()> {
    let token = std::env::var("INPUT_BEARER_TOKEN").ok();
    let bytes = load_input(&config.input, token.as_deref()).await?;

    let deliveries = run(config, &bytes)?;

    if deliveries.is_empty() {
        info!("No reports produced");
        return Ok(());
    }

    let Some(bucket) = &config.s3_bucket else {
        return Ok(());
    };

    info!(bucket = %bucket, gzip = config.gzip, "S3 upload enabled");
    let aws = aws_config::load_from_env().await;
    let s3 = aws_sdk_s3::Client::new(&aws);

    let paths: Vec<PathBuf> = deliveries
        .iter()
        .flat_map(|d| d.paths.iter().cloned())
        .collect();
    upload_artifacts(&s3, bucket, &config.output_dir, &paths, config.gzip).await?;

    Ok(())
}
