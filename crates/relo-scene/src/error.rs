//! Scene error types

use crate::node::NodeId;
use thiserror::Error;

/// Errors from scene graph and undo operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {node} cannot be parented under {parent}: would create a cycle")]
    Cycle { node: NodeId, parent: NodeId },

    #[error("Node already present in scene: {0}")]
    DuplicateNode(NodeId),

    #[error("World transform of {0} is not invertible")]
    Singular(NodeId),

    #[error("An undo group is already open: {0}")]
    GroupOpen(String),

    #[error("No undo group is open")]
    NoOpenGroup,
}
