use std::path::Path;

use rusqlite::Connection;

mod aggregation;
mod environments;
mod error;
mod migrations;
mod reports;
mod retention;
mod types;
mod usage;

pub use error::{DbError, Result};
pub use types::{ApiUsageGroup, FeatureEvaluationGroup, ResourceTotal};

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        conn.pragma_update(None, "cache_size", -20_000)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }
}
