//! Graph error type.

use crate::model::EdgeId;
use asgraph_core::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0:?} already exists")]
    NodeAlreadyExists(String),

    #[error("no such node: {0}")]
    NoSuchNode(String),

    #[error("no such edge: {0}")]
    NoSuchEdge(EdgeId),

    #[error("node uid must not be empty")]
    EmptyUid,

    #[error(transparent)]
    IoFailure(#[from] CodecError),
}

impl From<std::io::Error> for GraphError {
    fn from(e: std::io::Error) -> Self {
        GraphError::IoFailure(CodecError::Io(e))
    }
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
