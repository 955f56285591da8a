use chrono::{DateTime, Duration, SecondsFormat, Timelike, Utc};

use crate::error::{AppError, Result};

/// One aggregation window: half-open at the start, inclusive at the end.
/// Events with `start < created_at <= end` belong to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts > self.start && ts <= self.end
    }

    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Align `now` down to the most recent `bucket_size`-minute boundary within
/// the hour, truncating seconds and sub-seconds. Bucket sizes must divide 60
/// to tile the hour without drift; only the upper bound is enforced here.
pub fn current_bucket_start(bucket_size: u32, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    validate_bucket_size(bucket_size)?;
    let truncated = now
        .with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(now);
    let offset = truncated.minute() % bucket_size;
    Ok(truncated - Duration::minutes(offset as i64))
}

/// The fully elapsed windows to (re-)process on this invocation, most recent
/// first. The still-open bucket containing `now` is never included, so no
/// window is ever aggregated while events can still land in it. When
/// `run_every` is not a multiple of `bucket_size` the remainder is dropped
/// and fewer windows are returned.
pub fn time_windows(bucket_size: u32, run_every: u32, now: DateTime<Utc>) -> Result<Vec<TimeWindow>> {
    let first_start = current_bucket_start(bucket_size, now)?;
    let num_windows = run_every / bucket_size;
    let mut windows = Vec::with_capacity(num_windows as usize);
    for i in 0..num_windows {
        let end = first_start - Duration::minutes((bucket_size * i) as i64);
        let start = end - Duration::minutes(bucket_size as i64);
        windows.push(TimeWindow { start, end });
    }
    Ok(windows)
}

fn validate_bucket_size(bucket_size: u32) -> Result<()> {
    if bucket_size == 0 {
        return Err(AppError::InvalidConfiguration(
            "bucket size cannot be zero".to_string(),
        ));
    }
    if bucket_size > 60 {
        return Err(AppError::InvalidConfiguration(
            "bucket size cannot be greater than 60 minutes".to_string(),
        ));
    }
    Ok(())
}
