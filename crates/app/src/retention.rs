use chrono::{DateTime, Duration, SecondsFormat, Utc};
use tracing::debug;

use analytics_db::Db;

use crate::config::AnalyticsConfig;
use crate::error::Result;

/// Delete raw rows older than `raw_retention_days` and bucket rows older
/// than `bucketed_retention_days`. Runs daily; deletes are bulk and final.
pub fn clean_up_old_analytics_data(
    db: &Db,
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> Result<()> {
    let raw_cutoff = cutoff(now, config.raw_retention_days);
    let raw_api = db.delete_api_usage_raw_before(&raw_cutoff)?;
    let raw_evaluations = db.delete_feature_evaluation_raw_before(&raw_cutoff)?;

    let bucket_cutoff = cutoff(now, config.bucketed_retention_days);
    let bucket_api = db.delete_api_usage_buckets_before(&bucket_cutoff)?;
    let bucket_evaluations = db.delete_feature_evaluation_buckets_before(&bucket_cutoff)?;

    debug!(
        raw_api,
        raw_evaluations,
        bucket_api,
        bucket_evaluations,
        "cleaned up old analytics data"
    );
    Ok(())
}

fn cutoff(now: DateTime<Utc>, days: u32) -> String {
    (now - Duration::days(days as i64)).to_rfc3339_opts(SecondsFormat::Millis, true)
}
