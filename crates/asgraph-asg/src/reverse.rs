//! Incoming-edge index.

use crate::factory::Factory;
use crate::node::NodeId;
use crate::schema::EdgeKind;
use std::collections::HashMap;

/// Snapshot of every unfiltered edge keyed by its target.
///
/// The index does not follow later mutations of the store; rebuild it
/// after editing edges.
#[derive(Debug, Default)]
pub struct ReverseEdges {
    incoming: HashMap<NodeId, Vec<(EdgeKind, NodeId)>>,
}

impl ReverseEdges {
    pub fn build(factory: &Factory) -> Self {
        let mut incoming: HashMap<NodeId, Vec<(EdgeKind, NodeId)>> = HashMap::new();
        for node in factory.iter() {
            for (edge, target) in node.out_edges() {
                incoming.entry(target).or_default().push((edge, node.id()));
            }
        }
        tracing::debug!("reverse edges built for {} targets", incoming.len());
        ReverseEdges { incoming }
    }

    /// `(edge, source)` pairs pointing at `id`, sources in id order.
    pub fn incoming(&self, id: NodeId) -> &[(EdgeKind, NodeId)] {
        self.incoming.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sources pointing at `id` through `edge`.
    pub fn incoming_by(&self, id: NodeId, edge: EdgeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.incoming(id)
            .iter()
            .filter(move |(e, _)| *e == edge)
            .map(|(_, source)| *source)
    }

    pub fn has_incoming(&self, id: NodeId) -> bool {
        !self.incoming(id).is_empty()
    }
}
