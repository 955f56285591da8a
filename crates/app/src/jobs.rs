use chrono::{DateTime, Utc};

use analytics_db::Db;

use crate::aggregation::populate_bucket;
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::retention::clean_up_old_analytics_data;

const MINUTES_PER_DAY: u32 = 1440;

enum JobKind {
    PopulateBucket {
        bucket_size: u32,
        run_every: u32,
        source_bucket_size: Option<u32>,
    },
    CleanUp,
}

/// One entry for an external recurring-task scheduler: invoke `run` every
/// `run_every_minutes`, at-least-once semantics. Retry and backoff belong to
/// the scheduler, not to the jobs.
pub struct RecurringJob {
    pub name: &'static str,
    pub run_every_minutes: u32,
    kind: JobKind,
}

impl RecurringJob {
    pub fn run(&self, config: &AnalyticsConfig) -> Result<()> {
        self.run_at(config, Utc::now())
    }

    pub fn run_at(&self, config: &AnalyticsConfig, now: DateTime<Utc>) -> Result<()> {
        let mut db = Db::open(&config.db_path)?;
        match self.kind {
            JobKind::PopulateBucket {
                bucket_size,
                run_every,
                source_bucket_size,
            } => populate_bucket(&mut db, bucket_size, run_every, source_bucket_size, now),
            JobKind::CleanUp => clean_up_old_analytics_data(&db, config, now),
        }
    }
}

/// The job schedule for one deployment. The main pass aggregates raw events
/// at `config.bucket_size`; with `daily_rollup` enabled a daily pass builds
/// hourly buckets from the granularity the main pass writes instead of
/// re-scanning raw data.
pub fn recurring_jobs(config: &AnalyticsConfig) -> Result<Vec<RecurringJob>> {
    config.validate()?;
    let mut jobs = vec![
        RecurringJob {
            name: "populate_bucket",
            run_every_minutes: config.run_every,
            kind: JobKind::PopulateBucket {
                bucket_size: config.bucket_size,
                run_every: config.run_every,
                source_bucket_size: None,
            },
        },
        RecurringJob {
            name: "clean_up_old_analytics_data",
            run_every_minutes: MINUTES_PER_DAY,
            kind: JobKind::CleanUp,
        },
    ];
    if config.daily_rollup {
        jobs.push(RecurringJob {
            name: "populate_bucket_daily",
            run_every_minutes: MINUTES_PER_DAY,
            kind: JobKind::PopulateBucket {
                bucket_size: 60,
                run_every: MINUTES_PER_DAY,
                source_bucket_size: Some(config.bucket_size),
            },
        });
    }
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn schedule_includes_rollup_only_when_configured() {
        let mut config = AnalyticsConfig::new(PathBuf::from("/tmp/analytics.sqlite"));
        let jobs = recurring_jobs(&config).expect("jobs");
        let names: Vec<&str> = jobs.iter().map(|job| job.name).collect();
        assert_eq!(names, vec!["populate_bucket", "clean_up_old_analytics_data"]);

        config.bucket_size = 30;
        config.daily_rollup = true;
        let jobs = recurring_jobs(&config).expect("jobs");
        let rollup = jobs
            .iter()
            .find(|job| job.name == "populate_bucket_daily")
            .expect("rollup job");
        assert_eq!(rollup.run_every_minutes, MINUTES_PER_DAY);
    }

    #[test]
    fn schedule_rejects_invalid_configuration() {
        let mut config = AnalyticsConfig::new(PathBuf::from("/tmp/analytics.sqlite"));
        config.bucket_size = 90;
        assert!(recurring_jobs(&config).is_err());
    }
}
