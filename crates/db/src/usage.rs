use rusqlite::params;

use analytics_core::{ApiUsageRaw, FeatureEvaluationRaw, labels_to_json};

use crate::Db;
use crate::error::Result;

impl Db {
    pub fn insert_api_usage(&mut self, events: &[ApiUsageRaw]) -> Result<usize> {
        if events.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO api_usage_raw (
                  environment_id, resource, host, count, labels, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;
            for event in events {
                stmt.execute(params![
                    event.environment_id,
                    event.resource.as_i64(),
                    event.host,
                    event.count as i64,
                    labels_to_json(&event.labels),
                    event.created_at,
                ])?;
                inserted += 1;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    pub fn insert_feature_evaluations(
        &mut self,
        events: &[FeatureEvaluationRaw],
    ) -> Result<usize> {
        if events.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO feature_evaluation_raw (
                  environment_id, feature_name, evaluation_count, identity_identifier,
                  enabled_when_evaluated, labels, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )?;
            for event in events {
                stmt.execute(params![
                    event.environment_id,
                    event.feature_name,
                    event.evaluation_count as i64,
                    event.identity_identifier,
                    event.enabled_when_evaluated,
                    labels_to_json(&event.labels),
                    event.created_at,
                ])?;
                inserted += 1;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    pub fn count_api_usage_raw(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM api_usage_raw", [], |row| row.get(0))
            .map_err(crate::error::DbError::from)
    }

    pub fn count_feature_evaluation_raw(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM feature_evaluation_raw", [], |row| {
                row.get(0)
            })
            .map_err(crate::error::DbError::from)
    }
}
