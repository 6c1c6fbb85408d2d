use thiserror::Error;

/// Storage-layer error taxonomy. "Wrong password" is deliberately absent:
/// a failed authenticate is a normal `Ok(None)`, not an error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    /// Duplicate username or email on signup. Carries the offending field.
    #[error("{0} already taken")]
    UniqueViolation(&'static str),

    #[error("follow edge already exists")]
    DuplicateEdge,

    #[error("not authorized to modify this resource")]
    Unauthorized,

    #[error("record not found")]
    NotFound,

    /// Underlying SQLite failure, propagated unmodified. No retries.
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
