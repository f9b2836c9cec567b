use chrono::NaiveDate;
use tracing::warn;

use crate::analyzers::calendar::iso_week_of;
use crate::analyzers::types::{Bucket, Diagnostic, IsoWeekKey, NormalizedRecord, ReleaseSpeed};
use crate::error::{ReleaseError, Result};

const FAST_RELEASE: &str = "fast";

/// Anything other than exactly `fast` counts as slow, including blanks and
/// unexpected values.
pub fn release_speed(record: &NormalizedRecord) -> ReleaseSpeed {
    if record.release_type == FAST_RELEASE {
        ReleaseSpeed::Fast
    } else {
        ReleaseSpeed::Slow
    }
}

/// UTC calendar day of the merge.
pub fn release_day(record: &NormalizedRecord) -> Result<NaiveDate> {
    record
        .timestamp
        .map(|ts| ts.date())
        .map_err(|source| ReleaseError::Timestamp {
            value: record.merged_at.clone(),
            source,
        })
}

pub fn release_week(record: &NormalizedRecord) -> Result<IsoWeekKey> {
    release_day(record).map(iso_week_of)
}

/// Bucket contents plus the records that could not be keyed.
#[derive(Debug)]
pub struct Classified<K: Ord> {
    pub bucket: Bucket<K>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Buckets `records` by `key_of`. A record whose key cannot be computed is
/// skipped and reported as a diagnostic.
pub fn classify_by<K, F>(records: &[NormalizedRecord], key_of: F) -> Classified<K>
where
    K: Ord,
    F: Fn(&NormalizedRecord) -> Result<K>,
{
    let mut bucket = Bucket::new();
    let mut diagnostics = Vec::new();

    for record in records {
        match key_of(record) {
            Ok(key) => bucket.add(key),
            Err(e) => {
                warn!(line = record.line, error = %e, "Skipping release record");
                diagnostics.push(Diagnostic {
                    line: record.line,
                    value: record.merged_at.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Classified {
        bucket,
        diagnostics,
    }
}
