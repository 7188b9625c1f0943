use confentry_core::{BackendError, DecodeError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A body was required but none was sent.
    #[error("EOF")]
    EmptyBody,

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Backend(#[from] BackendError),
}
