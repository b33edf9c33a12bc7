//! Error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DoserError {
    #[error("invalid input: {}", .0.join("; "))]
    InvalidInput(Vec<String>),

    #[error("failed to read catalog {path}: {source}")]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid catalog entry '{name}': {reason}")]
    InvalidDevice { name: String, reason: String },

    #[error("catalog is already installed")]
    CatalogAlreadyInstalled,

    #[error("session {0} not found")]
    SessionNotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, DoserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_joins_messages() {
        let err = DoserError::InvalidInput(vec![
            "THC percentage must be between 0 and 100".to_string(),
            "Desired dose must be greater than 0".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid input: THC percentage must be between 0 and 100; Desired dose must be greater than 0"
        );
    }
}
