//! Error types for the reminder engine
//!
//! Infrastructure failures use thiserror for structured error handling.
//! Component boundaries (repository, registry, transition handling) return
//! their own tagged outcomes and only convert from these at the edge.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_display_string() {
        let err = AppError::Storage("disk full".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Storage error: disk full\"");
    }
}
