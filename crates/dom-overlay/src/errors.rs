use thiserror::Error;

use crate::dom::NodeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OverlayError {
    #[error("target {0:?} is not attached to the document")]
    Detached(NodeId),
}

/// Reasons a range cannot be wrapped in place.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("range container {0:?} has no parent")]
    Orphan(NodeId),
    #[error("range {start}..{end} is invalid for a node of length {len}")]
    InvalidOffsets { start: usize, end: usize, len: usize },
    #[error("range container {0:?} is already inside a highlight")]
    AlreadyWrapped(NodeId),
}
