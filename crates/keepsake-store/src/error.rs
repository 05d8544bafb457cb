use keepsake_revive::ReviveError;

/// Errors from save-slot operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The slot name is empty, too long, or has characters outside `[A-Za-z0-9_-]`.
    #[error("invalid slot name {name:?}: {reason}")]
    InvalidSlot { name: String, reason: &'static str },

    #[error("save slot not found: {0}")]
    NotFound(String),

    /// A save exceeded the configured size limit.
    #[error("save {slot} is {size} bytes, limit is {max}")]
    TooLarge { slot: String, size: u64, max: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    /// The save could not be serialized or revived.
    #[error(transparent)]
    Revive(#[from] ReviveError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
