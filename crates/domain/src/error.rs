/// Shared error type used across all working-memory crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A document failed a write-time invariant. Nothing was written.
    #[error("validation: {0}")]
    Validation(String),

    /// The key-value store was unreachable or returned a protocol error.
    #[error("store: {0}")]
    Store(String),

    /// Reconstruction from long-term memory failed. Never surfaced by the
    /// read path; kept as a variant so the engine can log a typed cause.
    #[error("reconstruction: {0}")]
    Reconstruction(String),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("long-term memory: {0}")]
    LongTerm(String),

    #[error("config: {0}")]
    Config(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
