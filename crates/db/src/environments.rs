use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};

use analytics_core::Environment;

use crate::Db;
use crate::error::{DbError, Result};

impl Db {
    pub fn add_environment(&self, api_key: &str, name: &str) -> Result<Environment> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            r#"
            INSERT INTO environment (api_key, name, created_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![api_key, name, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.environment_by_id(id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn environment_by_id(&self, id: i64) -> Result<Option<Environment>> {
        self.conn
            .query_row(
                "SELECT id, api_key, name FROM environment WHERE id = ?1",
                params![id],
                row_to_environment,
            )
            .optional()
            .map_err(DbError::from)
    }

    pub fn environment_id_by_key(&self, api_key: &str) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT id FROM environment WHERE api_key = ?1",
                params![api_key],
                |row| row.get(0),
            )
            .optional()
            .map_err(DbError::from)
    }
}

fn row_to_environment(row: &Row<'_>) -> std::result::Result<Environment, rusqlite::Error> {
    Ok(Environment {
        id: row.get(0)?,
        api_key: row.get(1)?,
        name: row.get(2)?,
    })
}
