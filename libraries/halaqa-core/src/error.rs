/// Core error types for Halaqa Player
use crate::types::ItemId;
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Halaqa Player
#[derive(Error, Debug)]
pub enum CoreError {
    /// The same item id appears twice in a catalog
    #[error("Duplicate item in catalog: {0}")]
    DuplicateItem(ItemId),

    /// Key-value store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Playlist not found
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
