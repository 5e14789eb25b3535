use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate entry id in catalog: {0}")]
    DuplicateId(String),

    #[error("entry '{id}' has priority {priority}, expected 1 to 10")]
    InvalidPriority { id: String, priority: u8 },

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("data directory does not exist and could not be created: {0}")]
    DataDir(PathBuf),

    #[error("no async runtime available: {0}")]
    Runtime(String),
}
