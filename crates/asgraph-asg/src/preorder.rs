//! Preorder traversal over the containment tree.
//!
//! Only containment edges are descended into. Reference edges are
//! reported to the visitor and, depending on the configuration, queued
//! for a later top-level visit, so a walk terminates even though the
//! full edge graph is cyclic. The walk keeps its own frame stack instead
//! of recursing.

use crate::error::{AsgError, Result};
use crate::factory::{Factory, NodeRef};
use crate::node::NodeId;
use crate::schema::EdgeKind;
use std::collections::VecDeque;
use std::ops::ControlFlow;

/// Callbacks invoked by [`Preorder`]. Every method has a no-op default.
///
/// Returning `ControlFlow::Break` from [`Visitor::visit`] or
/// [`Visitor::visit_edge`] ends the whole walk; no further callbacks
/// (including pending `visit_end`s) are made apart from `finish`.
pub trait Visitor {
    fn begin(&mut self, _factory: &Factory) {}

    fn finish(&mut self, _factory: &Factory) {}

    /// Entering a node; `depth` is 0 for walk roots.
    fn visit(&mut self, _node: NodeRef<'_>, _depth: usize) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_end(&mut self, _node: NodeRef<'_>, _depth: usize) {}

    fn visit_edge(&mut self, _from: NodeRef<'_>, _edge: EdgeKind, _to: NodeRef<'_>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called after the target's subtree for containment edges, right
    /// after `visit_edge` for reference edges.
    fn visit_edge_end(&mut self, _from: NodeRef<'_>, _edge: EdgeKind, _to: NodeRef<'_>) {}
}

/// What to do with nodes outside the containment tree of a rooted walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecialNodePolicy {
    #[default]
    Skip,
    /// Visit every special node not yet visited, in id order.
    VisitAll,
    /// Visit special nodes reached by an edge during the walk, repeating
    /// until no new ones turn up.
    VisitReferencedOnly,
}

/// Summary of a finished walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreorderStats {
    pub visited: usize,
    pub roots: usize,
    pub stopped: bool,
}

/// Traversal configuration.
#[derive(Debug, Clone, Default)]
pub struct Preorder {
    safe_mode: bool,
    special_nodes: SpecialNodePolicy,
    cross_edge_tree: bool,
    max_depth: Option<usize>,
}

impl Preorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never enter a node twice.
    pub fn safe_mode(mut self, on: bool) -> Self {
        self.safe_mode = on;
        self
    }

    pub fn special_nodes(mut self, policy: SpecialNodePolicy) -> Self {
        self.special_nodes = policy;
        self
    }

    /// In rooted walks, also visit the targets of reference edges after
    /// the main walk (transitively).
    pub fn cross_edge_tree(mut self, on: bool) -> Self {
        self.cross_edge_tree = on;
        self
    }

    /// Fail with [`AsgError::DepthLimit`] below this containment depth.
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Visits every unfiltered, un-parented node in id order.
    pub fn run<V: Visitor + ?Sized>(&self, factory: &Factory, visitor: &mut V) -> Result<PreorderStats> {
        let mut walk = Walk::new(self, factory, visitor, false);
        walk.visitor.begin(factory);
        let roots = factory.roots();
        tracing::debug!("preorder over {} roots", roots.len());
        let result = walk.run_roots(&roots);
        walk.visitor.finish(factory);
        result.map(|()| walk.stats)
    }

    /// Visits the containment subtree of `start`, then special nodes per
    /// the configured policy.
    pub fn run_from<V: Visitor + ?Sized>(
        &self,
        factory: &Factory,
        start: NodeId,
        visitor: &mut V,
    ) -> Result<PreorderStats> {
        factory.get_ref(start)?;
        let mut walk = Walk::new(self, factory, visitor, true);
        walk.visitor.begin(factory);
        let result = walk.run_rooted(start);
        walk.visitor.finish(factory);
        result.map(|()| walk.stats)
    }
}

struct Frame {
    id: NodeId,
    depth: usize,
    edges: Vec<(EdgeKind, NodeId)>,
    next: usize,
    /// Containment edge whose `visit_edge_end` is due once the child
    /// frame is done.
    pending_end: Option<(EdgeKind, NodeId)>,
}

struct Walk<'a, V: ?Sized> {
    config: &'a Preorder,
    factory: &'a Factory,
    visitor: &'a mut V,
    rooted: bool,
    visited: Option<Vec<bool>>,
    queued: Vec<bool>,
    worklist: VecDeque<NodeId>,
    stats: PreorderStats,
}

impl<'a, V: Visitor + ?Sized> Walk<'a, V> {
    fn new(config: &'a Preorder, factory: &'a Factory, visitor: &'a mut V, rooted: bool) -> Self {
        let tracking = config.safe_mode
            || config.cross_edge_tree
            || config.special_nodes != SpecialNodePolicy::Skip;
        Walk {
            config,
            factory,
            visitor,
            rooted,
            visited: tracking.then(|| vec![false; factory.capacity()]),
            queued: Vec::new(),
            worklist: VecDeque::new(),
            stats: PreorderStats::default(),
        }
    }

    fn run_roots(&mut self, roots: &[NodeId]) -> Result<()> {
        for &root in roots {
            self.stats.roots += 1;
            self.walk(root)?;
            if self.stats.stopped {
                break;
            }
        }
        Ok(())
    }

    fn run_rooted(&mut self, start: NodeId) -> Result<()> {
        if self.factory.is_filtered(start) {
            tracing::debug!("preorder start node {start} is filtered");
            return Ok(());
        }
        self.stats.roots += 1;
        self.walk(start)?;

        if self.config.special_nodes == SpecialNodePolicy::VisitAll {
            let pending: Vec<NodeId> = self
                .factory
                .iter()
                .filter(|n| n.kind().is_special() && !self.was_visited(n.id()))
                .map(|n| n.id())
                .collect();
            for id in pending {
                if self.stats.stopped {
                    return Ok(());
                }
                if !self.was_visited(id) {
                    self.stats.roots += 1;
                    self.walk(id)?;
                }
            }
        }

        while let Some(id) = self.worklist.pop_front() {
            if self.stats.stopped {
                break;
            }
            if !self.was_visited(id) {
                self.stats.roots += 1;
                self.walk(id)?;
            }
        }
        Ok(())
    }

    fn was_visited(&self, id: NodeId) -> bool {
        self.visited
            .as_ref()
            .is_some_and(|v| v.get(id.index()).copied().unwrap_or(false))
    }

    /// Marks and enters `id`; false if it was skipped or the visitor
    /// stopped the walk.
    fn enter(&mut self, id: NodeId, depth: usize) -> Result<bool> {
        let node = self.factory.get_ref(id)?;
        if let Some(visited) = self.visited.as_mut() {
            let seen = &mut visited[id.index()];
            if *seen && self.config.safe_mode {
                return Ok(false);
            }
            *seen = true;
        }
        self.stats.visited += 1;
        if self.visitor.visit(node, depth).is_break() {
            self.stats.stopped = true;
            return Ok(false);
        }
        Ok(true)
    }

    fn frame(&self, id: NodeId, depth: usize) -> Result<Frame> {
        let edges = self.factory.get_ref(id)?.out_edges().collect();
        Ok(Frame {
            id,
            depth,
            edges,
            next: 0,
            pending_end: None,
        })
    }

    fn defers(&self, edge: EdgeKind, to: NodeRef<'_>) -> bool {
        if !self.rooted {
            return false;
        }
        let special = self.config.special_nodes == SpecialNodePolicy::VisitReferencedOnly
            && to.kind().is_special();
        special || (self.config.cross_edge_tree && !edge.is_containment())
    }

    fn queue(&mut self, id: NodeId) {
        if self.was_visited(id) {
            return;
        }
        if self.queued.len() <= id.index() {
            self.queued.resize(self.factory.capacity().max(id.index() + 1), false);
        }
        if !self.queued[id.index()] {
            self.queued[id.index()] = true;
            self.worklist.push_back(id);
        }
    }

    fn walk(&mut self, root: NodeId) -> Result<()> {
        if !self.enter(root, 0)? {
            return Ok(());
        }
        let mut stack = vec![self.frame(root, 0)?];

        while let Some(frame) = stack.last_mut() {
            let from = self.factory.get_ref(frame.id)?;

            if let Some((edge, to)) = frame.pending_end.take() {
                self.visitor.visit_edge_end(from, edge, self.factory.get_ref(to)?);
            }

            if frame.next == frame.edges.len() {
                let depth = frame.depth;
                stack.pop();
                self.visitor.visit_end(from, depth);
                continue;
            }

            let (edge, to_id) = frame.edges[frame.next];
            frame.next += 1;
            let child_depth = frame.depth + 1;
            let to = self.factory.get_ref(to_id)?;

            if self.visitor.visit_edge(from, edge, to).is_break() {
                self.stats.stopped = true;
                return Ok(());
            }

            if self.defers(edge, to) {
                self.queue(to_id);
                self.visitor.visit_edge_end(from, edge, to);
                continue;
            }
            if !edge.is_containment() {
                self.visitor.visit_edge_end(from, edge, to);
                continue;
            }

            frame.pending_end = Some((edge, to_id));
            if let Some(max) = self.config.max_depth {
                if child_depth > max {
                    return Err(AsgError::DepthLimit(max));
                }
            }
            if self.enter(to_id, child_depth)? {
                stack.push(self.frame(to_id, child_depth)?);
            } else if self.stats.stopped {
                return Ok(());
            }
        }
        Ok(())
    }
}
