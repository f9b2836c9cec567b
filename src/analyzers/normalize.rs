use chrono::{NaiveDateTime, Timelike};

use crate::analyzers::types::{NormalizedRecord, RawRecord};
use crate::error::TimestampError;

/// Canonical name of the production branch.
pub const PROD_BRANCH: &str = "prod";

const LEGACY_PROD_BRANCH: &str = "master";

/// Exact UTC layout of the `Merged At` column.
pub const MERGED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Maps legacy branch names onto their canonical form.
pub fn canonical_branch(branch: &str) -> &str {
    if branch == LEGACY_PROD_BRANCH {
        PROD_BRANCH
    } else {
        branch
    }
}

/// Parses `value` in exactly [`MERGED_AT_FORMAT`].
///
/// chrono alone tolerates leading whitespace, a signed year and second `60`;
/// all three are rejected here.
pub fn parse_merged_at(value: &str) -> Result<NaiveDateTime, TimestampError> {
    if value.starts_with(|c: char| c.is_whitespace() || c == '+' || c == '-') {
        return Err(TimestampError::Prefix);
    }

    let ts = NaiveDateTime::parse_from_str(value, MERGED_AT_FORMAT)?;
    // chrono encodes a leap second as nanosecond >= 1e9
    if ts.nanosecond() >= 1_000_000_000 {
        return Err(TimestampError::LeapSecond);
    }
    Ok(ts)
}

/// Canonicalizes branches and keeps only production records, in input order.
///
/// Records on any other branch are dropped without a diagnostic.
pub fn normalize(records: &[RawRecord]) -> Vec<NormalizedRecord> {
    records
        .iter()
        .filter(|r| canonical_branch(&r.branch) == PROD_BRANCH)
        .map(|r| NormalizedRecord {
            branch: PROD_BRANCH.to_string(),
            release_type: r.release_type.clone(),
            merged_at: r.merged_at.clone(),
            timestamp: parse_merged_at(&r.merged_at),
            line: r.line,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_is_rewritten_to_prod() {
        assert_eq!(canonical_branch("master"), "prod");
        assert_eq!(canonical_branch("prod"), "prod");
        assert_eq!(canonical_branch("staging"), "staging");
    }

    #[test]
    fn test_branch_rewrite_is_case_sensitive() {
        assert_eq!(canonical_branch("Master"), "Master");
    }

    #[test]
    fn test_master_and_prod_admitted_identically() {
        let records = vec![
            RawRecord::new("master", "fast", "2024-10-14T09:00:00Z"),
            RawRecord::new("prod", "fast", "2024-10-14T09:00:00Z"),
        ];
        let admitted = normalize(&records);

        assert_eq!(admitted.len(), 2);
        assert_eq!(admitted[0].branch, admitted[1].branch);
        assert_eq!(admitted[0].timestamp, admitted[1].timestamp);
    }

    #[test]
    fn test_other_branches_dropped_and_order_kept() {
        let records = vec![
            RawRecord::new("prod", "fast", "2024-10-14T09:00:00Z").at_line(2),
            RawRecord::new("staging", "fast", "2024-10-14T10:00:00Z").at_line(3),
            RawRecord::new("master", "slow", "2024-10-15T09:00:00Z").at_line(4),
            RawRecord::new("develop", "slow", "2024-10-15T10:00:00Z").at_line(5),
        ];
        let admitted = normalize(&records);

        let lines: Vec<_> = admitted.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 4]);
    }

    #[test]
    fn test_timestamp_validity_flag() {
        let records = vec![
            RawRecord::new("prod", "fast", "2024-10-14T09:30:15Z"),
            RawRecord::new("prod", "fast", "not-a-date"),
            RawRecord::new("prod", "fast", "2024-10-14 09:30:15"),
        ];
        let admitted = normalize(&records);

        assert!(admitted[0].has_valid_timestamp());
        assert!(!admitted[1].has_valid_timestamp());
        assert!(!admitted[2].has_valid_timestamp());
    }

    #[test]
    fn test_parse_merged_at_requires_trailing_z() {
        assert!(parse_merged_at("2024-10-14T09:30:15Z").is_ok());
        assert!(parse_merged_at("2024-10-14T09:30:15+00:00").is_err());
        assert!(parse_merged_at("2024-10-14T09:30:15Z ").is_err());
    }

    #[test]
    fn test_parse_merged_at_is_exact() {
        assert_eq!(
            parse_merged_at(" 2024-10-14T09:00:00Z"),
            Err(TimestampError::Prefix)
        );
        assert_eq!(
            parse_merged_at("\t2024-10-14T09:00:00Z"),
            Err(TimestampError::Prefix)
        );
        assert_eq!(
            parse_merged_at("+2024-10-14T09:00:00Z"),
            Err(TimestampError::Prefix)
        );
        assert_eq!(
            parse_merged_at("-2024-10-14T09:00:00Z"),
            Err(TimestampError::Prefix)
        );
        assert_eq!(
            parse_merged_at("2024-10-14T09:00:60Z"),
            Err(TimestampError::LeapSecond)
        );
        assert!(matches!(
            parse_merged_at("12024-10-14T09:00:00Z"),
            Err(TimestampError::Format(_))
        ));
        assert!(parse_merged_at("2024-10-14T23:59:59Z").is_ok());
    }

    #[test]
    fn test_loose_timestamps_are_not_dated() {
        let admitted = normalize(&[
            RawRecord::new("prod", "fast", " 2024-10-14T09:00:00Z"),
            RawRecord::new("prod", "fast", "+2024-10-14T09:00:00Z"),
            RawRecord::new("prod", "fast", "2024-10-14T09:00:60Z"),
        ]);

        assert_eq!(admitted.len(), 3);
        assert!(admitted.iter().all(|r| !r.has_valid_timestamp()));
    }
}
