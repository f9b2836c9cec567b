//! Release aggregation pipeline.
//!
//! This module normalizes raw pull-request records and keeps only
//! production releases. It buckets them by release speed, calendar day or
//! ISO week, reindexes the buckets against the matching calendar, and
//! computes summary statistics.

pub mod aggregate;
pub mod analyzer;
pub mod calendar;
pub mod classify;
pub mod normalize;
pub mod types;
pub mod utility;
