use rusqlite::params;

use analytics_core::Resource;

use crate::Db;
use crate::error::{DbError, Result};
use crate::types::ResourceTotal;

impl Db {
    /// Bucketed usage summed per resource for one environment over a
    /// reporting period, read at the given granularity.
    pub fn api_usage_totals(
        &self,
        environment_id: i64,
        bucket_size: u32,
        period_start: &str,
        period_end: &str,
    ) -> Result<Vec<ResourceTotal>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT resource, SUM(total_count)
            FROM api_usage_bucket
            WHERE environment_id = ?1
              AND bucket_size = ?2
              AND bucket_start >= ?3
              AND bucket_start < ?4
            GROUP BY resource
            ORDER BY resource ASC
            "#,
        )?;
        let rows = stmt
            .query_map(
                params![environment_id, bucket_size, period_start, period_end],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(resource_code, total)| {
                let resource = Resource::from_i64(resource_code)
                    .ok_or(DbError::UnknownResource(resource_code))?;
                Ok(ResourceTotal {
                    resource,
                    total_count: total.max(0) as u64,
                })
            })
            .collect()
    }
}
