#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

use analytics_core::{ApiUsageRaw, FeatureEvaluationRaw, Labels, Resource};
use analytics_db::Db;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn labels(pairs: &[(&str, &str)]) -> Labels {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn make_api_usage(
    environment_id: i64,
    resource: Resource,
    count: u64,
    labels: Labels,
    created_at: &str,
) -> ApiUsageRaw {
    ApiUsageRaw {
        environment_id,
        resource,
        host: "app.example.com".to_string(),
        count,
        labels,
        created_at: created_at.to_string(),
    }
}

pub fn make_feature_evaluation(
    environment_id: i64,
    feature_name: &str,
    count: u64,
    labels: Labels,
    created_at: &str,
) -> FeatureEvaluationRaw {
    FeatureEvaluationRaw {
        environment_id,
        feature_name: feature_name.to_string(),
        evaluation_count: count,
        identity_identifier: None,
        enabled_when_evaluated: Some(true),
        labels,
        created_at: created_at.to_string(),
    }
}
