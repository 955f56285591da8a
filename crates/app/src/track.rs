use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use tracing::debug;

use analytics_core::{
    ApiUsageRaw, FeatureEvaluation, FeatureEvaluationRaw, Labels, Resource, normalize_labels,
};
use analytics_db::Db;

use crate::error::Result;

/// One tracked API call, as received from the request layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedRequest {
    pub resource: Resource,
    pub host: String,
    pub environment_key: String,
    pub count: u64,
    pub labels: Option<Labels>,
}

/// Destination for tracked events, selected once at process start.
/// Tracking is best-effort telemetry: an unresolvable environment key is a
/// silent no-op, not an error.
pub trait UsageSink {
    fn track_request(&mut self, request: TrackedRequest) -> Result<()>;

    fn track_feature_evaluations(
        &mut self,
        environment_id: i64,
        evaluations: &[FeatureEvaluation],
    ) -> Result<()>;
}

/// External time-series backend. Implementations live outside the core.
pub trait TimeSeriesWriter {
    fn write_api_usage(&mut self, event: &ApiUsageRaw) -> Result<()>;

    fn write_feature_evaluations(&mut self, events: &[FeatureEvaluationRaw]) -> Result<()>;
}

/// Writes raw rows into the relational store.
pub struct RelationalSink {
    db_path: PathBuf,
}

impl RelationalSink {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    fn db(&self) -> Result<Db> {
        Ok(Db::open(&self.db_path)?)
    }
}

impl UsageSink for RelationalSink {
    fn track_request(&mut self, request: TrackedRequest) -> Result<()> {
        let mut db = self.db()?;
        let Some(event) = resolve_api_usage(&db, request)? else {
            return Ok(());
        };
        db.insert_api_usage(&[event])?;
        Ok(())
    }

    fn track_feature_evaluations(
        &mut self,
        environment_id: i64,
        evaluations: &[FeatureEvaluation],
    ) -> Result<()> {
        let mut db = self.db()?;
        let rows = evaluation_rows(environment_id, evaluations);
        db.insert_feature_evaluations(&rows)?;
        Ok(())
    }
}

/// Forwards tracked events to an injected time-series backend. Environment
/// resolution still goes through the relational store.
pub struct TimeSeriesSink {
    db_path: PathBuf,
    writer: Box<dyn TimeSeriesWriter + Send>,
}

impl TimeSeriesSink {
    pub fn new(db_path: PathBuf, writer: Box<dyn TimeSeriesWriter + Send>) -> Self {
        Self { db_path, writer }
    }
}

impl UsageSink for TimeSeriesSink {
    fn track_request(&mut self, request: TrackedRequest) -> Result<()> {
        let db = Db::open(&self.db_path)?;
        let Some(event) = resolve_api_usage(&db, request)? else {
            return Ok(());
        };
        self.writer.write_api_usage(&event)
    }

    fn track_feature_evaluations(
        &mut self,
        environment_id: i64,
        evaluations: &[FeatureEvaluation],
    ) -> Result<()> {
        let rows = evaluation_rows(environment_id, evaluations);
        self.writer.write_feature_evaluations(&rows)
    }
}

/// Track one API call against the environment identified by `environment_key`.
pub fn track_request(
    sink: &mut dyn UsageSink,
    resource: Resource,
    host: &str,
    environment_key: &str,
    count: u64,
    labels: Option<Labels>,
) -> Result<()> {
    sink.track_request(TrackedRequest {
        resource,
        host: host.to_string(),
        environment_key: environment_key.to_string(),
        count,
        labels,
    })
}

/// Bulk-track feature evaluations for one environment.
pub fn track_feature_evaluations_by_environment(
    sink: &mut dyn UsageSink,
    environment_id: i64,
    evaluations: &[FeatureEvaluation],
) -> Result<()> {
    sink.track_feature_evaluations(environment_id, evaluations)
}

fn resolve_api_usage(db: &Db, request: TrackedRequest) -> Result<Option<ApiUsageRaw>> {
    let Some(environment_id) = db.environment_id_by_key(&request.environment_key)? else {
        debug!(
            environment_key = %request.environment_key,
            "dropping tracked request for unknown environment"
        );
        return Ok(None);
    };
    Ok(Some(ApiUsageRaw {
        environment_id,
        resource: request.resource,
        host: request.host,
        count: request.count,
        labels: normalize_labels(request.labels),
        created_at: now_rfc3339(),
    }))
}

fn evaluation_rows(
    environment_id: i64,
    evaluations: &[FeatureEvaluation],
) -> Vec<FeatureEvaluationRaw> {
    let created_at = now_rfc3339();
    evaluations
        .iter()
        .map(|evaluation| FeatureEvaluationRaw {
            environment_id,
            feature_name: evaluation.feature_name.clone(),
            evaluation_count: evaluation.count,
            identity_identifier: evaluation.identity_identifier.clone(),
            enabled_when_evaluated: evaluation.enabled_when_evaluated,
            labels: normalize_labels(evaluation.labels.clone()),
            created_at: created_at.clone(),
        })
        .collect()
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
