//! Ошибки подготовки данных

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrepError>;

#[derive(Error, Debug)]
pub enum PrepError {
    /// Сеть, таймаут или HTTP статус
    #[error("failed to fetch resource: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("column '{column}' contains missing values")]
    MissingValue { column: String },

    #[error("empty table: {0}")]
    EmptyTable(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PrepError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn unknown_column(name: &str) -> Self {
        Self::Config(format!("unknown column '{name}'"))
    }
}
