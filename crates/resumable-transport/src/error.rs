//! Error types for resumable-transport.

use std::sync::Arc;

use thiserror::Error;

/// Shared, cheaply cloneable error source.
///
/// Sources are kept behind an `Arc` so a recorded failure can be handed back
/// to the caller more than once (see [`ResumableBody`](crate::ResumableBody)).
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The wrapper's cancellation context was already spent on an earlier download.
    #[error("context already used")]
    ContextUsed,

    /// The request context fired before a resume could be attempted.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The body was read after it was closed.
    #[error("read on closed body")]
    BodyClosed,

    /// The transport could not complete a request/response exchange.
    #[error("transport error: {0}")]
    Transport(#[source] SharedError),

    /// The response body stream broke before reaching its end.
    #[error("body stream error: {0}")]
    Stream(#[source] SharedError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// Wrap a request-establishment failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Transport(Arc::new(err))
    }

    /// Wrap a mid-stream body failure.
    pub fn stream(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Stream(Arc::new(err))
    }

    /// Returns `true` for the sentinel raised when a spent context is reused.
    pub fn is_context_used(&self) -> bool {
        matches!(self, Error::ContextUsed)
    }

    /// Returns `true` for the sentinel raised when the caller's deadline passed.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Error::DeadlineExceeded)
    }

    /// Returns `true` if both errors carry the very same source.
    ///
    /// Used to tell a replayed failure from a fresh one with the same message.
    pub fn same_source(&self, other: &Error) -> bool {
        match (self, other) {
            (Error::Transport(a), Error::Transport(b)) | (Error::Stream(a), Error::Stream(b)) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}
