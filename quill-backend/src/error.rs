use std::fmt;

/// Repository-layer errors.
#[derive(Debug)]
pub enum StoreError {
    /// Note missing or owned by someone else; callers cannot tell which.
    NoteNotFound,
    /// A tag name that had to exist does not.
    TagNotFound,
    /// Unique-constraint conflict (e.g. duplicate username).
    Conflict(String),
    Sqlite(rusqlite::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NoteNotFound => write!(f, "Note not found"),
            StoreError::TagNotFound => write!(f, "Tag not found"),
            StoreError::Conflict(msg) => write!(f, "{}", msg),
            StoreError::Sqlite(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sqlite(e)
    }
}
