//! Flattens an ASG into the generic attributed graph.
//!
//! Every unfiltered ASG node becomes a graph node with uid `L<id>` and the
//! kind name as its type. Edges keep their schema names; containment edges
//! also get a `Reverse` pair so parents can be found from children.

use asgraph_asg::{Factory, NodeId, PosKind, SourcePosition};
use asgraph_graph::{Graph, Result};

/// Graph attributes are `i32`; larger coordinates are clamped.
fn coord(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Graph uid of an ASG node.
pub fn graph_uid(id: NodeId) -> String {
    format!("L{}", id.0)
}

pub fn asg_to_graph(factory: &Factory) -> Result<Graph> {
    let mut graph = Graph::new();
    for (key, value) in factory.header().iter() {
        graph.set_header_info(key, value);
    }

    for node in factory.iter() {
        let id = graph.create_node(&graph_uid(node.id()), node.kind().as_str())?;
        if let Some(name) = node.name().filter(|n| !n.is_empty()) {
            let attr = graph.string_attribute("name", "", name);
            graph.add_node_attribute(id, attr)?;
        }
        for pos in [PosKind::Position, PosKind::BodyPosition] {
            let Some(span) = node.position(pos).filter(|p| *p != SourcePosition::default()) else {
                continue;
            };
            let path = factory.strings().get(span.path).unwrap_or_default();
            let mut attr = graph.composite_attribute(&pos.to_string(), "");
            let children = [
                graph.string_attribute("path", "", path),
                graph.int_attribute("line", "", coord(span.line)),
                graph.int_attribute("column", "", coord(span.col)),
                graph.int_attribute("endLine", "", coord(span.end_line)),
                graph.int_attribute("endColumn", "", coord(span.end_col)),
            ];
            if let Some(list) = attr.children_mut() {
                for child in children {
                    list.add(child);
                }
            }
            graph.add_node_attribute(id, attr)?;
        }
    }

    for node in factory.iter() {
        let from = graph_uid(node.id());
        for (edge, target) in node.out_edges() {
            graph.create_directed_edge_by_uid(&from, &graph_uid(target), edge.as_str(), edge.is_containment())?;
        }
    }

    tracing::debug!(
        "converted {} ASG nodes into {} graph nodes and {} edges",
        factory.len(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}
