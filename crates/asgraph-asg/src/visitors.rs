//! Visitors shipped with the engine.

use crate::factory::{Factory, NodeRef};
use crate::node::NodeId;
use crate::preorder::Visitor;
use crate::schema::{EdgeKind, NodeKind};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::ops::ControlFlow;

/// Drives several visitors in one walk, in the order they were added.
///
/// A visitor that breaks gets no further callbacks apart from `finish`;
/// the walk itself stops once every visitor has broken.
#[derive(Default)]
pub struct VisitorSet<'v> {
    members: Vec<(&'v mut dyn Visitor, bool)>,
}

impl<'v> VisitorSet<'v> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, visitor: &'v mut dyn Visitor) -> Self {
        self.push(visitor);
        self
    }

    pub fn push(&mut self, visitor: &'v mut dyn Visitor) {
        self.members.push((visitor, false));
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn active(&mut self) -> impl Iterator<Item = &mut (&'v mut dyn Visitor, bool)> {
        self.members.iter_mut().filter(|(_, stopped)| !*stopped)
    }

    fn all_stopped(&self) -> ControlFlow<()> {
        if !self.members.is_empty() && self.members.iter().all(|(_, stopped)| *stopped) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

impl Visitor for VisitorSet<'_> {
    fn begin(&mut self, factory: &Factory) {
        for (v, _) in &mut self.members {
            v.begin(factory);
        }
    }

    fn finish(&mut self, factory: &Factory) {
        for (v, _) in &mut self.members {
            v.finish(factory);
        }
    }

    fn visit(&mut self, node: NodeRef<'_>, depth: usize) -> ControlFlow<()> {
        for (v, stopped) in self.active() {
            *stopped = v.visit(node, depth).is_break();
        }
        self.all_stopped()
    }

    fn visit_end(&mut self, node: NodeRef<'_>, depth: usize) {
        for (v, _) in self.active() {
            v.visit_end(node, depth);
        }
    }

    fn visit_edge(&mut self, from: NodeRef<'_>, edge: EdgeKind, to: NodeRef<'_>) -> ControlFlow<()> {
        for (v, stopped) in self.active() {
            *stopped = v.visit_edge(from, edge, to).is_break();
        }
        self.all_stopped()
    }

    fn visit_edge_end(&mut self, from: NodeRef<'_>, edge: EdgeKind, to: NodeRef<'_>) {
        for (v, _) in self.active() {
            v.visit_edge_end(from, edge, to);
        }
    }
}

/// Collects node ids in visit order.
#[derive(Debug, Default)]
pub struct SubtreeCollector {
    ids: Vec<NodeId>,
}

impl SubtreeCollector {
    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn into_ids(self) -> Vec<NodeId> {
        self.ids
    }
}

impl Visitor for SubtreeCollector {
    fn visit(&mut self, node: NodeRef<'_>, _depth: usize) -> ControlFlow<()> {
        self.ids.push(node.id());
        ControlFlow::Continue(())
    }
}

/// Node and edge counts gathered during a walk.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AsgStat {
    pub nodes: BTreeMap<NodeKind, usize>,
    pub edges: BTreeMap<EdgeKind, usize>,
    pub max_depth: usize,
}

impl AsgStat {
    pub fn node_total(&self) -> usize {
        self.nodes.values().sum()
    }

    pub fn edge_total(&self) -> usize {
        self.edges.values().sum()
    }

    /// One `Kind: count` line per node kind, then the edge total.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (kind, count) in &self.nodes {
            let _ = writeln!(out, "{kind}: {count}");
        }
        let _ = writeln!(out, "nodes: {}", self.node_total());
        let _ = writeln!(out, "edges: {}", self.edge_total());
        out
    }
}

impl Visitor for AsgStat {
    fn visit(&mut self, node: NodeRef<'_>, depth: usize) -> ControlFlow<()> {
        *self.nodes.entry(node.kind()).or_insert(0) += 1;
        self.max_depth = self.max_depth.max(depth);
        ControlFlow::Continue(())
    }

    fn visit_edge(&mut self, _from: NodeRef<'_>, edge: EdgeKind, _to: NodeRef<'_>) -> ControlFlow<()> {
        *self.edges.entry(edge).or_insert(0) += 1;
        ControlFlow::Continue(())
    }
}

/// Indented text trace: one line per node, plus one per reference edge.
///
/// ```text
/// Class#2 "A"
///   Method#3 "m"
///     overrides -> #5
/// ```
#[derive(Debug, Default)]
pub struct TraceVisitor {
    out: String,
    level: usize,
}

impl TraceVisitor {
    pub fn output(&self) -> &str {
        &self.out
    }

    pub fn into_output(self) -> String {
        self.out
    }

    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push_str("  ");
        }
    }
}

impl Visitor for TraceVisitor {
    fn begin(&mut self, _factory: &Factory) {
        self.level = 0;
    }

    fn visit(&mut self, node: NodeRef<'_>, depth: usize) -> ControlFlow<()> {
        self.indent(depth);
        let _ = write!(self.out, "{}#{}", node.kind(), node.id());
        if let Some(name) = node.name().filter(|n| !n.is_empty()) {
            let _ = write!(self.out, " {name:?}");
        }
        self.out.push('\n');
        self.level = depth + 1;
        ControlFlow::Continue(())
    }

    fn visit_end(&mut self, _node: NodeRef<'_>, depth: usize) {
        self.level = depth;
    }

    fn visit_edge(&mut self, _from: NodeRef<'_>, edge: EdgeKind, to: NodeRef<'_>) -> ControlFlow<()> {
        if !edge.is_containment() {
            self.indent(self.level);
            let _ = writeln!(self.out, "{edge} -> #{}", to.id());
        }
        ControlFlow::Continue(())
    }
}
