use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Raised synchronously for bad job parameters; never retried.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Store failure mid-job. Already-committed windows stay committed.
    #[error("db error: {0}")]
    Db(#[from] analytics_db::DbError),
    #[error("time-series backend error: {0}")]
    TimeSeries(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
