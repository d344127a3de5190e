//! ASG error type.

use crate::node::NodeId;
use crate::schema::{AttrKind, EdgeKind, NodeKind, PosKind, ScalarType};
use asgraph_core::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AsgError {
    #[error("node {0} already exists")]
    NodeAlreadyExists(NodeId),

    #[error("no such node: {0}")]
    NoSuchNode(NodeId),

    #[error("edge {edge} of node {node} is already set")]
    EdgeAlreadySet { node: NodeId, edge: EdgeKind },

    #[error("edge {edge} of node {node} cannot point to {target} of kind {kind}")]
    InvalidEdgeTargetKind {
        node: NodeId,
        edge: EdgeKind,
        target: NodeId,
        kind: NodeKind,
    },

    #[error("{kind} nodes have no {edge} edge of that cardinality")]
    NoSuchEdge { kind: NodeKind, edge: EdgeKind },

    #[error("{kind} nodes have no attribute {attr}")]
    NoSuchAttribute { kind: NodeKind, attr: AttrKind },

    #[error("{kind} nodes have no position {pos}")]
    NoSuchPosition { kind: NodeKind, pos: PosKind },

    #[error("attribute {attr} expects a {expected} value")]
    AttributeType { attr: AttrKind, expected: ScalarType },

    #[error("unknown node kind tag {0}")]
    UnknownNodeKind(u16),

    #[error("incompatible file: {0}")]
    IncompatibleFile(String),

    #[error("cannot allocate storage for node {0}")]
    OutOfIds(NodeId),

    #[error("traversal exceeded the depth limit of {0}")]
    DepthLimit(usize),

    #[error("filter state: {0}")]
    Filter(#[from] bincode::Error),

    #[error(transparent)]
    IoFailure(#[from] CodecError),
}

impl From<std::io::Error> for AsgError {
    fn from(e: std::io::Error) -> Self {
        AsgError::IoFailure(CodecError::Io(e))
    }
}

pub type Result<T, E = AsgError> = std::result::Result<T, E>;
