//! asgraph-asg: typed abstract semantic graph store, preorder traversal
//! and binary codec.

pub mod codec;
pub mod error;
pub mod factory;
pub mod filter;
pub mod header;
pub mod node;
pub mod preorder;
pub mod reverse;
pub mod schema;
pub mod visitors;


#[cfg(test)]
pub mod test_utils;

pub use error::{AsgError, Result};
pub use factory::{Factory, NodeRef};
pub use filter::Filter;
pub use header::Header;
pub use node::{Node, NodeId, SourcePosition, Value};
pub use preorder::{Preorder, PreorderStats, SpecialNodePolicy, Visitor};
pub use reverse::ReverseEdges;
pub use schema::{AttrKind, Capability, EdgeKind, KindSchema, NodeKind, PosKind, ScalarType};
pub use visitors::{AsgStat, SubtreeCollector, TraceVisitor, VisitorSet};
