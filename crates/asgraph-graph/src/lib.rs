//! asgraph-graph: string-keyed attributed graph with typed, directional
//! edges and explicit reverse pairs.

pub mod codec;
pub mod error;
pub mod graph;
pub mod merge;
pub mod model;
pub mod traverse;

#[cfg(test)]
mod tests;

pub use error::{GraphError, Result};
pub use graph::Graph;
pub use merge::{AttributeMerge, MergeMode, MergeOptions, NumericMerge, TextMerge};
pub use model::{Direction, EdgeId, EdgeType, GraphEdge, GraphNode, NodeId};
pub use traverse::{DfsOrder, GraphVisitor};
