//! Error handling for DrawKit
//!
//! Provides error types for the layers of the engine:
//! - Geometry errors (scene queries that cannot be answered)
//! - A crate-wide umbrella error for callers that mix layers
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::data::NodeId;

/// Geometry error type
///
/// Raised by scene-graph queries. The engine treats every variant as
/// recoverable: the affected object is skipped for the current operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The node id does not exist in the scene
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    /// The node has no parent, so parent-space coordinates are undefined
    #[error("Node {0} has no parent")]
    NoParent(NodeId),

    /// The node's world transform cannot be inverted (zero scale)
    #[error("Transform of node {0} is not invertible")]
    NonInvertible(NodeId),

    /// The node has no drawable content to measure
    #[error("Node {0} has no bounds")]
    EmptyBounds(NodeId),

    /// The node does not support the requested capability
    #[error("Node {node} does not support {capability}")]
    Unsupported {
        /// The node that was queried.
        node: NodeId,
        /// The missing capability.
        capability: &'static str,
    },
}

/// Main error type for DrawKit
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }
}

/// Result type for DrawKit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for scene-graph queries
pub type GeometryResult<T> = std::result::Result<T, GeometryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_error_display() {
        let err = GeometryError::NoParent(NodeId(7));
        assert_eq!(err.to_string(), "Node #7 has no parent");

        let err = GeometryError::Unsupported {
            node: NodeId(3),
            capability: "corner radius",
        };
        assert_eq!(err.to_string(), "Node #3 does not support corner radius");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = GeometryError::NodeNotFound(NodeId(1)).into();
        assert!(err.is_geometry_error());
        assert_eq!(err.to_string(), "Node #1 not found");
        assert!(!Error::other("boom").is_geometry_error());
    }
}
