use ledger::LedgerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}
