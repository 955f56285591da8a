use rusqlite::params;

use analytics_core::{
    ApiUsageBucket, FeatureEvaluationBucket, Resource, labels_from_json, labels_to_json,
};

use crate::Db;
use crate::error::{DbError, Result};
use crate::types::{ApiUsageGroup, FeatureEvaluationGroup};

impl Db {
    /// Grouped sums feeding one API usage bucket window. Reads raw events,
    /// or the finer bucket table when `source_bucket_size` is set.
    ///
    /// Raw bounds are half-open at the start: `created_at > from`, `<= till`.
    /// Bucket sources flip the bounds: a fine bucket keyed by start `s`
    /// covers events in `(s, s + size]`, so the fine buckets belonging to a
    /// coarse window `(from, till]` are exactly those with
    /// `from <= bucket_start < till`.
    pub fn api_usage_source_rows(
        &self,
        process_from: &str,
        process_till: &str,
        source_bucket_size: Option<u32>,
    ) -> Result<Vec<ApiUsageGroup>> {
        let (sql, bucket_size_param) = match source_bucket_size {
            Some(size) => (
                r#"
                SELECT environment_id, resource, labels, SUM(total_count)
                FROM api_usage_bucket
                WHERE bucket_start >= ?1 AND bucket_start < ?2 AND bucket_size = ?3
                GROUP BY environment_id, resource, labels
                "#,
                Some(size),
            ),
            None => (
                r#"
                SELECT environment_id, resource, labels, SUM(count)
                FROM api_usage_raw
                WHERE created_at > ?1 AND created_at <= ?2
                GROUP BY environment_id, resource, labels
                "#,
                None,
            ),
        };
        let mut stmt = self.conn.prepare(sql)?;
        let rows = if let Some(size) = bucket_size_param {
            stmt.query_map(params![process_from, process_till, size], row_to_group)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![process_from, process_till], row_to_group)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        };
        rows.into_iter()
            .map(|(environment_id, resource_code, labels, count)| {
                let resource = Resource::from_i64(resource_code)
                    .ok_or(DbError::UnknownResource(resource_code))?;
                Ok(ApiUsageGroup {
                    environment_id,
                    resource,
                    labels: labels_from_json(&labels),
                    count: count.max(0) as u64,
                })
            })
            .collect()
    }

    pub fn feature_evaluation_source_rows(
        &self,
        process_from: &str,
        process_till: &str,
        source_bucket_size: Option<u32>,
    ) -> Result<Vec<FeatureEvaluationGroup>> {
        let (sql, bucket_size_param) = match source_bucket_size {
            Some(size) => (
                r#"
                SELECT environment_id, feature_name, labels, SUM(total_count)
                FROM feature_evaluation_bucket
                WHERE bucket_start >= ?1 AND bucket_start < ?2 AND bucket_size = ?3
                GROUP BY environment_id, feature_name, labels
                "#,
                Some(size),
            ),
            None => (
                r#"
                SELECT environment_id, feature_name, labels, SUM(evaluation_count)
                FROM feature_evaluation_raw
                WHERE created_at > ?1 AND created_at <= ?2
                GROUP BY environment_id, feature_name, labels
                "#,
                None,
            ),
        };
        let mut stmt = self.conn.prepare(sql)?;
        let rows = if let Some(size) = bucket_size_param {
            stmt.query_map(params![process_from, process_till, size], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![process_from, process_till], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?
        };
        Ok(rows
            .into_iter()
            .map(|(environment_id, feature_name, labels, count)| FeatureEvaluationGroup {
                environment_id,
                feature_name,
                labels: labels_from_json(&labels),
                count: count.max(0) as u64,
            })
            .collect())
    }

    /// Upsert one window's worth of API usage groups in a single
    /// transaction. The composite key overwrites `total_count` on conflict,
    /// so reruns over unchanged source data are idempotent.
    pub fn upsert_api_usage_buckets(
        &mut self,
        bucket_size: u32,
        bucket_start: &str,
        groups: &[ApiUsageGroup],
    ) -> Result<usize> {
        if groups.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut written = 0usize;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO api_usage_bucket (
                  environment_id, resource, bucket_size, bucket_start, labels, total_count
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(environment_id, resource, bucket_size, bucket_start, labels)
                DO UPDATE SET total_count = excluded.total_count
                "#,
            )?;
            for group in groups {
                stmt.execute(params![
                    group.environment_id,
                    group.resource.as_i64(),
                    bucket_size,
                    bucket_start,
                    labels_to_json(&group.labels),
                    group.count as i64,
                ])?;
                written += 1;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    pub fn upsert_feature_evaluation_buckets(
        &mut self,
        bucket_size: u32,
        bucket_start: &str,
        groups: &[FeatureEvaluationGroup],
    ) -> Result<usize> {
        if groups.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut written = 0usize;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO feature_evaluation_bucket (
                  environment_id, feature_name, bucket_size, bucket_start, labels, total_count
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(environment_id, feature_name, bucket_size, bucket_start, labels)
                DO UPDATE SET total_count = excluded.total_count
                "#,
            )?;
            for group in groups {
                stmt.execute(params![
                    group.environment_id,
                    group.feature_name,
                    bucket_size,
                    bucket_start,
                    labels_to_json(&group.labels),
                    group.count as i64,
                ])?;
                written += 1;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    pub fn list_api_usage_buckets(&self, bucket_size: u32) -> Result<Vec<ApiUsageBucket>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT environment_id, resource, bucket_size, bucket_start, labels, total_count
            FROM api_usage_bucket
            WHERE bucket_size = ?1
            ORDER BY bucket_start ASC, environment_id ASC, resource ASC, labels ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![bucket_size], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(
                |(environment_id, resource_code, bucket_size, bucket_start, labels, total)| {
                    let resource = Resource::from_i64(resource_code)
                        .ok_or(DbError::UnknownResource(resource_code))?;
                    Ok(ApiUsageBucket {
                        environment_id,
                        resource,
                        bucket_size,
                        bucket_start,
                        labels: labels_from_json(&labels),
                        total_count: total.max(0) as u64,
                    })
                },
            )
            .collect()
    }

    pub fn list_feature_evaluation_buckets(
        &self,
        bucket_size: u32,
    ) -> Result<Vec<FeatureEvaluationBucket>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT environment_id, feature_name, bucket_size, bucket_start, labels, total_count
            FROM feature_evaluation_bucket
            WHERE bucket_size = ?1
            ORDER BY bucket_start ASC, environment_id ASC, feature_name ASC, labels ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![bucket_size], |row| {
                Ok(FeatureEvaluationBucket {
                    environment_id: row.get(0)?,
                    feature_name: row.get(1)?,
                    bucket_size: row.get(2)?,
                    bucket_start: row.get(3)?,
                    labels: analytics_core::labels_from_json(&row.get::<_, String>(4)?),
                    total_count: row.get::<_, i64>(5)?.max(0) as u64,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn row_to_group(
    row: &rusqlite::Row<'_>,
) -> std::result::Result<(i64, i64, String, i64), rusqlite::Error> {
    Ok((
        row.get::<_, i64>(0)?,
        row.get::<_, i64>(1)?,
        row.get::<_, String>(2)?,
        row.get::<_, i64>(3)?,
    ))
}
