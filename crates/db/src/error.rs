#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("time parse error: {0}")]
    TimeParse(#[from] chrono::ParseError),
    #[error("unknown resource code: {0}")]
    UnknownResource(i64),
}

pub type Result<T> = std::result::Result<T, DbError>;
