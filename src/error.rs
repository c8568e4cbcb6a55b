//! Error types for the canvas engine

use thiserror::Error;

/// Result type alias using CanvasError
pub type Result<T> = std::result::Result<T, CanvasError>;

/// Why a candidate connection was refused.
///
/// These are recoverable: the model is left untouched and no history is
/// recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectionRejection {
    /// Source and target are the same node
    #[error("a node cannot connect to itself")]
    SelfLoop,

    /// An edge with the same endpoints and ports already exists
    #[error("connection already exists")]
    Duplicate,

    /// The target already reaches the source, so the edge would close a loop
    #[error("circular connection not allowed")]
    Cycle,
}

/// Errors raised at the mutation boundary of the engine
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Edge not found: {from} -> {to}")]
    EdgeNotFound { from: String, to: String },

    /// Connection refused by the guard
    #[error("Connection rejected: {0}")]
    Rejected(#[from] ConnectionRejection),

    /// A required field was blank or out of range
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CanvasError {
    /// Create an invalid submission error with a message
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidSubmission(msg.into())
    }

    /// True for the non-fatal connection rejections
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}
