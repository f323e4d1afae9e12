use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

/// 存储层错误 / Store-layer error
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database config error: {0}")]
    Config(String),
    #[error("connection pool error: {0}")]
    Pool(String),
    #[error("record not found")]
    NotFound,
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                DbError::ConstraintViolation(db.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => DbError::Pool(e.to_string()),
            other => DbError::Sqlx(other),
        }
    }
}
