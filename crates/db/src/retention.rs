use rusqlite::params;

use crate::Db;
use crate::error::Result;

impl Db {
    pub fn delete_api_usage_raw_before(&self, cutoff: &str) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM api_usage_raw WHERE created_at < ?1",
            params![cutoff],
        )?;
        Ok(deleted)
    }

    pub fn delete_feature_evaluation_raw_before(&self, cutoff: &str) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM feature_evaluation_raw WHERE created_at < ?1",
            params![cutoff],
        )?;
        Ok(deleted)
    }

    pub fn delete_api_usage_buckets_before(&self, cutoff: &str) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM api_usage_bucket WHERE bucket_start < ?1",
            params![cutoff],
        )?;
        Ok(deleted)
    }

    pub fn delete_feature_evaluation_buckets_before(&self, cutoff: &str) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM feature_evaluation_bucket WHERE bucket_start < ?1",
            params![cutoff],
        )?;
        Ok(deleted)
    }
}
