use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The notes document does not exist yet.
    #[error("Notes file not found: {}", .0.display())]
    StoreMissing(PathBuf),

    /// The notes document exists but has no content.
    #[error("Notes file is empty: {}", .0.display())]
    StoreEmpty(PathBuf),

    /// The notes document could not be parsed into groups and notes.
    #[error("Notes file is damaged: {}: {source}", path.display())]
    StoreMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to save notes: {0}")]
    Persist(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Document store error: {0}")]
    Document(#[from] surrealdb::Error),

    /// A stored value could not be decoded (bad id or timestamp).
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// Another group (or note) already has this title.
    #[error("Title already in use: {0}")]
    DuplicateTitle(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("{0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, NotesError>;
