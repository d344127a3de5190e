//! Node and edge payloads.

use asgraph_core::{AttributeList, Key};
use std::fmt;

/// Node handle. Ids are handed out in creation order and never reused,
/// so a handle to a deleted node stays dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Edge handle, ordered and never reused like [`NodeId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Edge direction. The discriminant is the on-disk value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// One half of a two-way edge; its pair is also `Bidirectional`.
    Bidirectional = 0,
    Directional = 1,
    /// Synthetic opposite of a `Directional` edge.
    Reverse = 2,
}

impl Direction {
    pub fn from_u32(v: u32) -> Option<Direction> {
        match v {
            0 => Some(Direction::Bidirectional),
            1 => Some(Direction::Directional),
            2 => Some(Direction::Reverse),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Bidirectional => "bidirectional",
            Direction::Directional => "directional",
            Direction::Reverse => "reverse",
        }
    }
}

/// Edge type name plus direction, as used by edge filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeType {
    pub name: String,
    pub direction: Direction,
}

impl EdgeType {
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        EdgeType { name: name.into(), direction }
    }

    pub fn directional(name: impl Into<String>) -> Self {
        Self::new(name, Direction::Directional)
    }

    pub fn reverse(name: impl Into<String>) -> Self {
        Self::new(name, Direction::Reverse)
    }

    pub fn bidirectional(name: impl Into<String>) -> Self {
        Self::new(name, Direction::Bidirectional)
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.direction.as_str())
    }
}

/// Node payload: interned uid and type.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub(crate) id: NodeId,
    pub uid: Key,
    pub node_type: Key,
    pub attributes: AttributeList,
}

/// Edge payload: interned type and direction.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub(crate) id: EdgeId,
    pub edge_type: Key,
    pub direction: Direction,
    pub attributes: AttributeList,
}
