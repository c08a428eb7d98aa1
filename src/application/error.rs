use thiserror::Error;

use crate::domain::ParseAmountError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid amount '{input}': {source}")]
    InvalidAmount {
        input: String,
        source: ParseAmountError,
    },

    #[error("Invalid timestamp '{0}'. Use YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
