pub mod aggregation;
pub mod buckets;
pub mod config;
pub mod error;
pub mod jobs;
pub mod retention;
pub mod track;

pub use aggregation::{
    populate_api_usage_bucket, populate_bucket, populate_feature_evaluation_bucket,
};
pub use buckets::{TimeWindow, current_bucket_start, time_windows};
pub use config::{ANALYTICS_READ_BUCKET_SIZE, AnalyticsConfig, SinkKind};
pub use error::{AppError, Result};
pub use jobs::{RecurringJob, recurring_jobs};
pub use retention::clean_up_old_analytics_data;
pub use track::{
    RelationalSink, TimeSeriesSink, TimeSeriesWriter, TrackedRequest, UsageSink, track_request,
    track_feature_evaluations_by_environment,
};
