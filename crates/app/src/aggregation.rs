use chrono::{DateTime, Utc};
use tracing::debug;

use analytics_db::Db;

use crate::buckets::time_windows;
use crate::error::Result;

/// Materialize API usage buckets at `bucket_size` for every fully elapsed
/// window of this invocation. With `source_bucket_size` set the finer bucket
/// table is read instead of raw events (cascading rollup).
///
/// Each window is one unit of work: its upserts commit in a single
/// transaction, and a failure aborts this window without rolling back
/// windows already committed. Overwrite-on-conflict keeps reruns idempotent.
pub fn populate_api_usage_bucket(
    db: &mut Db,
    bucket_size: u32,
    run_every: u32,
    source_bucket_size: Option<u32>,
    now: DateTime<Utc>,
) -> Result<()> {
    for window in time_windows(bucket_size, run_every, now)? {
        let groups = db.api_usage_source_rows(
            &window.start_rfc3339(),
            &window.end_rfc3339(),
            source_bucket_size,
        )?;
        let written =
            db.upsert_api_usage_buckets(bucket_size, &window.start_rfc3339(), &groups)?;
        debug!(
            bucket_size,
            bucket_start = %window.start_rfc3339(),
            written,
            "populated api usage bucket window"
        );
    }
    Ok(())
}

pub fn populate_feature_evaluation_bucket(
    db: &mut Db,
    bucket_size: u32,
    run_every: u32,
    source_bucket_size: Option<u32>,
    now: DateTime<Utc>,
) -> Result<()> {
    for window in time_windows(bucket_size, run_every, now)? {
        let groups = db.feature_evaluation_source_rows(
            &window.start_rfc3339(),
            &window.end_rfc3339(),
            source_bucket_size,
        )?;
        let written =
            db.upsert_feature_evaluation_buckets(bucket_size, &window.start_rfc3339(), &groups)?;
        debug!(
            bucket_size,
            bucket_start = %window.start_rfc3339(),
            written,
            "populated feature evaluation bucket window"
        );
    }
    Ok(())
}

/// One scheduled tick: both dimensions at the same granularity.
pub fn populate_bucket(
    db: &mut Db,
    bucket_size: u32,
    run_every: u32,
    source_bucket_size: Option<u32>,
    now: DateTime<Utc>,
) -> Result<()> {
    populate_api_usage_bucket(db, bucket_size, run_every, source_bucket_size, now)?;
    populate_feature_evaluation_bucket(db, bucket_size, run_every, source_bucket_size, now)?;
    Ok(())
}
