//! Breadth-first and depth-first walks restricted to chosen edge types.
//!
//! Every walk keeps a visited set, so a cyclic selection of edge types
//! still terminates; each reachable node is reported once.

use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::model::{EdgeId, EdgeType, NodeId};
use std::collections::{HashSet, VecDeque};

/// Callbacks for graph walks. All methods default to no-ops.
pub trait GraphVisitor {
    fn visit_node(&mut self, _graph: &Graph, _node: NodeId) {}

    /// Only called by [`DfsOrder::Both`], when leaving a node.
    fn visit_node_end(&mut self, _graph: &Graph, _node: NodeId) {}

    /// Called for every selected edge leaving a visited node, including
    /// edges to nodes seen before.
    fn visit_edge(&mut self, _graph: &Graph, _edge: EdgeId) {}
}

/// When `visit_node` fires during a depth-first walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DfsOrder {
    /// On entry.
    Pre,
    /// On exit.
    Post,
    /// `visit_node` on entry and `visit_node_end` on exit.
    Both,
}

impl Graph {
    /// Breadth-first walk from `start` over edges of `types`.
    pub fn bfs<V: GraphVisitor + ?Sized>(&self, start: NodeId, types: &[EdgeType], visitor: &mut V) -> Result<usize> {
        self.check_start(start)?;
        let wanted = self.type_keys(types);
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            visitor.visit_node(self, node);
            for edge in self.out_edges(node) {
                if !self.edge_matches(edge, &wanted) {
                    continue;
                }
                visitor.visit_edge(self, edge);
                if let Some(target) = self.edge_target(edge) {
                    if seen.insert(target) {
                        queue.push_back(target);
                    }
                }
            }
        }
        Ok(seen.len())
    }

    /// Depth-first walk from `start` over edges of `types`.
    pub fn dfs<V: GraphVisitor + ?Sized>(
        &self,
        start: NodeId,
        types: &[EdgeType],
        order: DfsOrder,
        visitor: &mut V,
    ) -> Result<usize> {
        self.check_start(start)?;
        let wanted = self.type_keys(types);
        let mut seen = HashSet::from([start]);
        // (node, selected out-edges, next edge)
        let mut stack: Vec<(NodeId, Vec<EdgeId>, usize)> = Vec::new();

        let selected = |node: NodeId| -> Vec<EdgeId> {
            self.out_edges(node)
                .into_iter()
                .filter(|&e| self.edge_matches(e, &wanted))
                .collect()
        };

        if order != DfsOrder::Post {
            visitor.visit_node(self, start);
        }
        stack.push((start, selected(start), 0));

        while let Some((node, edges, next)) = stack.last_mut() {
            let Some(&edge) = edges.get(*next) else {
                let node = *node;
                stack.pop();
                match order {
                    DfsOrder::Pre => {}
                    DfsOrder::Post => visitor.visit_node(self, node),
                    DfsOrder::Both => visitor.visit_node_end(self, node),
                }
                continue;
            };
            *next += 1;
            visitor.visit_edge(self, edge);
            let Some(target) = self.edge_target(edge) else {
                continue;
            };
            if !seen.insert(target) {
                continue;
            }
            if order != DfsOrder::Post {
                visitor.visit_node(self, target);
            }
            stack.push((target, selected(target), 0));
        }
        Ok(seen.len())
    }

    pub fn dfs_preorder<V: GraphVisitor + ?Sized>(&self, start: NodeId, types: &[EdgeType], visitor: &mut V) -> Result<usize> {
        self.dfs(start, types, DfsOrder::Pre, visitor)
    }

    pub fn dfs_postorder<V: GraphVisitor + ?Sized>(&self, start: NodeId, types: &[EdgeType], visitor: &mut V) -> Result<usize> {
        self.dfs(start, types, DfsOrder::Post, visitor)
    }

    fn check_start(&self, start: NodeId) -> Result<()> {
        match self.node(start) {
            Some(_) => Ok(()),
            None => Err(GraphError::NoSuchNode(start.to_string())),
        }
    }
}
