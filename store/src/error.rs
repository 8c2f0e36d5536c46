use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored version moved on since the caller loaded the record.
    #[error("version conflict on {id}: expected {expected}, found {found}")]
    Conflict { id: String, expected: u64, found: u64 },

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
