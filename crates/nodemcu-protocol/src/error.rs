//! Error types for the NodeMCU protocol.

use thiserror::Error;

/// Errors that can occur while talking to the remote interpreter.
#[derive(Debug, Error)]
pub enum NodeMcuError {
    /// The channel delivered fewer bytes than requested before giving up.
    #[error("timeout waiting for response: expected {expected} bytes, got {actual}")]
    Timeout { expected: usize, actual: usize },

    /// The channel accepted fewer bytes than it was given.
    #[error("short write: wrote {actual} of {expected} bytes")]
    ShortWrite { expected: usize, actual: usize },

    /// The remote returned `nil` (or not `true`) when opening a file.
    #[error("could not open file {filename:?}")]
    FileOpen { filename: String },

    /// The remote file table has no entry for the file.
    #[error("file {filename:?} does not exist")]
    FileNotFound { filename: String },

    /// A block write did not return `true`.
    #[error("write failed (return value: {response:?})")]
    Write { response: String },

    /// A rename did not return `true`.
    #[error("rename of {old:?} to {new:?} failed (return value: {response:?})")]
    Rename {
        old: String,
        new: String,
        response: String,
    },

    /// A response did not have the expected shape.
    #[error("unexpected response: {0:?}")]
    UnexpectedResponse(String),

    /// Failed to parse a numeric field in a response.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// A response line was not valid UTF-8.
    #[error("invalid UTF-8 in response")]
    InvalidUtf8,

    /// Block sizes must be at least one byte.
    #[error("block size must be non-zero")]
    InvalidBlockSize,

    /// The underlying channel failed.
    #[error("channel error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for NodeMCU operations.
pub type NodeMcuResult<T> = Result<T, NodeMcuError>;
