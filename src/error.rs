use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("input is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("invalid Merged At timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        source: TimestampError,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a `Merged At` value is not an exact `YYYY-MM-DDTHH:MM:SSZ` timestamp.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampError {
    #[error(transparent)]
    Format(#[from] chrono::ParseError),

    #[error("unexpected leading sign or whitespace")]
    Prefix,

    #[error("leap seconds are not accepted")]
    LeapSecond,
}

pub type Result<T> = std::result::Result<T, ReleaseError>;
