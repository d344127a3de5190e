//! Node store: owns every node by dense id.
//!
//! All mutation goes through schema-checked setters. Edge reads skip
//! targets that are currently filtered.

use crate::error::{AsgError, Result};
use crate::filter::{Filter, FilterFile};
use crate::header::Header;
use crate::node::{Node, NodeId, SourcePosition, Value};
use crate::preorder::Preorder;
use crate::schema::{AttrKind, EdgeKind, NodeKind, PosKind, ScalarType};
use crate::visitors::SubtreeCollector;
use asgraph_core::{AttributeList, Key, StrTable};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub struct Factory {
    /// Index is the node id; slot 0 stays empty.
    nodes: Vec<Option<Node>>,
    strings: StrTable,
    filter: Filter,
    header: Header,
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("node_count", &self.len())
            .field("capacity", &self.capacity())
            .field("filtered", &self.filter.count())
            .finish()
    }
}

impl Default for Factory {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory {
    pub fn new() -> Self {
        Self::with_header(Header::default())
    }

    pub fn with_header(header: Header) -> Self {
        Factory {
            nodes: vec![None],
            strings: StrTable::new(),
            filter: Filter::default(),
            header,
        }
    }

    /// Builds a store around an already loaded string table.
    pub(crate) fn from_parts(header: Header, strings: StrTable) -> Self {
        Factory {
            nodes: vec![None],
            strings,
            filter: Filter::default(),
            header,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    pub fn strings(&self) -> &StrTable {
        &self.strings
    }

    pub fn intern(&mut self, s: &str) -> Key {
        self.strings.set(s)
    }

    // ── Creation ─────────────────────────────────────────

    /// Creates a node with the next free id.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(Node::new(id, kind)));
        id
    }

    /// Creates a node with a caller-chosen id, as loaders do.
    pub fn create_node_with_id(&mut self, kind: NodeKind, id: NodeId) -> Result<NodeId> {
        if id.0 == 0 {
            return Err(AsgError::NoSuchNode(id));
        }
        if self.exists(id) {
            return Err(AsgError::NodeAlreadyExists(id));
        }
        if id.index() >= self.nodes.len() {
            let extra = id.index() + 1 - self.nodes.len();
            self.nodes
                .try_reserve_exact(extra)
                .map_err(|_| AsgError::OutOfIds(id))?;
            self.nodes.resize_with(id.index() + 1, || None);
        }
        self.nodes[id.index()] = Some(Node::new(id, kind));
        Ok(id)
    }

    // ── Lookup ───────────────────────────────────────────

    /// True if a node is stored under `id`, filtered or not.
    pub fn exists(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Read handle for `id`; works for filtered nodes too.
    pub fn get_ref(&self, id: NodeId) -> Result<NodeRef<'_>> {
        let node = self.require(id)?;
        Ok(NodeRef { factory: self, node })
    }

    pub fn kind(&self, id: NodeId) -> Result<NodeKind> {
        Ok(self.require(id)?.kind)
    }

    /// One past the highest id ever allocated.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Number of stored nodes, filtered ones included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unfiltered nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.iter_all()
            .filter(move |n| !self.filter.is_filtered(n.id))
            .map(move |node| NodeRef { factory: self, node })
    }

    /// Every stored node in id order, ignoring the filter.
    pub fn iter_all(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter_map(Option::as_ref)
    }

    /// Unfiltered nodes without a parent, in id order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|n| n.parent().is_none())
            .map(|n| n.id())
            .collect()
    }

    /// Unfiltered node count per kind.
    pub fn count_by_kind(&self) -> BTreeMap<NodeKind, usize> {
        let mut counts = BTreeMap::new();
        for node in self.iter() {
            *counts.entry(node.kind()).or_insert(0) += 1;
        }
        counts
    }

    fn require(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(AsgError::NoSuchNode(id))
    }

    pub(crate) fn require_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(AsgError::NoSuchNode(id))
    }

    // ── Attributes ───────────────────────────────────────

    pub fn set_attr(&mut self, id: NodeId, attr: AttrKind, value: Value) -> Result<()> {
        let node = self.require_mut(id)?;
        let slot = node
            .schema()
            .attr_slot(attr)
            .ok_or(AsgError::NoSuchAttribute { kind: node.kind, attr })?;
        let expected = attr.scalar_type();
        if value.scalar_type() != expected {
            return Err(AsgError::AttributeType { attr, expected });
        }
        node.values[slot] = value;
        Ok(())
    }

    /// Interns `value` and stores it in a string attribute.
    pub fn set_str(&mut self, id: NodeId, attr: AttrKind, value: &str) -> Result<()> {
        if attr.scalar_type() != ScalarType::Str {
            return Err(AsgError::AttributeType { attr, expected: attr.scalar_type() });
        }
        let key = self.strings.set(value);
        self.set_attr(id, attr, Value::Str(key))
    }

    pub fn set_name(&mut self, id: NodeId, name: &str) -> Result<()> {
        self.set_str(id, AttrKind::Name, name)
    }

    pub fn attr(&self, id: NodeId, attr: AttrKind) -> Result<Value> {
        let node = self.require(id)?;
        node.schema()
            .attr_slot(attr)
            .map(|slot| node.values[slot])
            .ok_or(AsgError::NoSuchAttribute { kind: node.kind, attr })
    }

    pub fn set_position(&mut self, id: NodeId, pos: PosKind, value: SourcePosition) -> Result<()> {
        let node = self.require_mut(id)?;
        let slot = node
            .schema()
            .position_slot(pos)
            .ok_or(AsgError::NoSuchPosition { kind: node.kind, pos })?;
        node.positions[slot] = value;
        Ok(())
    }

    pub fn position(&self, id: NodeId, pos: PosKind) -> Result<SourcePosition> {
        let node = self.require(id)?;
        node.schema()
            .position_slot(pos)
            .map(|slot| node.positions[slot])
            .ok_or(AsgError::NoSuchPosition { kind: node.kind, pos })
    }

    /// Free-form attributes attached to a node.
    pub fn annotations_mut(&mut self, id: NodeId) -> Result<&mut AttributeList> {
        Ok(&mut self.require_mut(id)?.annotations)
    }

    // ── Edges ────────────────────────────────────────────

    /// Sets a single edge. Fails if the edge already has a target.
    pub fn set_edge(&mut self, id: NodeId, edge: EdgeKind, target: NodeId) -> Result<()> {
        let node = self.require(id)?;
        let slot = node
            .schema()
            .single_slot(edge)
            .ok_or(AsgError::NoSuchEdge { kind: node.kind, edge })?;
        self.check_target(id, edge, target)?;
        let node = self.require_mut(id)?;
        if node.singles[slot].is_some() {
            return Err(AsgError::EdgeAlreadySet { node: id, edge });
        }
        node.singles[slot] = Some(target);
        self.adopt(id, edge, target);
        Ok(())
    }

    /// Appends to a multi edge; order is kept.
    pub fn add_edge(&mut self, id: NodeId, edge: EdgeKind, target: NodeId) -> Result<()> {
        let node = self.require(id)?;
        let slot = node
            .schema()
            .multi_slot(edge)
            .ok_or(AsgError::NoSuchEdge { kind: node.kind, edge })?;
        self.check_target(id, edge, target)?;
        self.require_mut(id)?.multis[slot].push(target);
        self.adopt(id, edge, target);
        Ok(())
    }

    /// Unsets a single edge, returning the previous target.
    pub fn clear_edge(&mut self, id: NodeId, edge: EdgeKind) -> Result<Option<NodeId>> {
        let node = self.require_mut(id)?;
        let slot = node
            .schema()
            .single_slot(edge)
            .ok_or(AsgError::NoSuchEdge { kind: node.kind, edge })?;
        let old = node.singles[slot].take();
        if let Some(target) = old {
            self.orphan(id, edge, target);
        }
        Ok(old)
    }

    /// Removes the first occurrence of `target` from a multi edge.
    pub fn remove_edge(&mut self, id: NodeId, edge: EdgeKind, target: NodeId) -> Result<bool> {
        let node = self.require_mut(id)?;
        let slot = node
            .schema()
            .multi_slot(edge)
            .ok_or(AsgError::NoSuchEdge { kind: node.kind, edge })?;
        let list = &mut node.multis[slot];
        let Some(pos) = list.iter().position(|t| *t == target) else {
            return Ok(false);
        };
        list.remove(pos);
        self.orphan(id, edge, target);
        Ok(true)
    }

    /// Target of a single edge, unless unset or filtered.
    pub fn edge(&self, id: NodeId, edge: EdgeKind) -> Result<Option<NodeId>> {
        let node = self.require(id)?;
        let slot = node
            .schema()
            .single_slot(edge)
            .ok_or(AsgError::NoSuchEdge { kind: node.kind, edge })?;
        Ok(node.singles[slot].filter(|t| !self.filter.is_filtered(*t)))
    }

    /// Unfiltered targets of a multi edge, in insertion order.
    pub fn edges(&self, id: NodeId, edge: EdgeKind) -> Result<impl Iterator<Item = NodeId> + '_> {
        let node = self.require(id)?;
        let slot = node
            .schema()
            .multi_slot(edge)
            .ok_or(AsgError::NoSuchEdge { kind: node.kind, edge })?;
        Ok(node.multis[slot]
            .iter()
            .copied()
            .filter(move |t| !self.filter.is_filtered(*t)))
    }

    fn check_target(&self, id: NodeId, edge: EdgeKind, target: NodeId) -> Result<()> {
        let kind = self.kind(target)?;
        if !kind.is(edge.desc().target) {
            return Err(AsgError::InvalidEdgeTargetKind { node: id, edge, target, kind });
        }
        Ok(())
    }

    fn adopt(&mut self, parent: NodeId, edge: EdgeKind, child: NodeId) {
        if !edge.is_containment() {
            return;
        }
        if let Some(node) = self.nodes.get_mut(child.index()).and_then(Option::as_mut) {
            if let Some(old) = node.parent.replace(parent) {
                if old != parent {
                    tracing::debug!("node {child} moved from parent {old} to {parent}");
                }
            }
        }
    }

    fn orphan(&mut self, parent: NodeId, edge: EdgeKind, child: NodeId) {
        if !edge.is_containment() {
            return;
        }
        if let Some(node) = self.nodes.get_mut(child.index()).and_then(Option::as_mut) {
            if node.parent == Some(parent) {
                node.parent = None;
            }
        }
    }

    // ── Filter ───────────────────────────────────────────

    pub fn is_filtered(&self, id: NodeId) -> bool {
        self.filter.is_filtered(id)
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Turns the filter off (everything visible) or back on.
    pub fn set_filter_enabled(&mut self, enabled: bool) {
        self.filter.set_enabled(enabled);
    }

    pub fn filter_enabled(&self) -> bool {
        self.filter.is_enabled()
    }

    /// Filters `id` and its whole containment subtree.
    pub fn set_filtered(&mut self, id: NodeId) -> Result<()> {
        for node in self.subtree_unfiltered(id)? {
            self.filter.mark(node, true);
        }
        Ok(())
    }

    pub fn set_filtered_this_node_only(&mut self, id: NodeId) -> Result<()> {
        self.require(id)?;
        self.filter.mark(id, true);
        Ok(())
    }

    /// Un-filters `id`, its subtree and all of its ancestors.
    pub fn set_not_filtered(&mut self, id: NodeId) -> Result<()> {
        for node in self.subtree_unfiltered(id)? {
            self.filter.mark(node, false);
        }
        let mut parent = self.require(id)?.parent;
        while let Some(p) = parent {
            self.filter.mark(p, false);
            parent = self.node(p).and_then(|n| n.parent);
        }
        Ok(())
    }

    pub fn set_not_filtered_this_node_only(&mut self, id: NodeId) -> Result<()> {
        self.require(id)?;
        self.filter.mark(id, false);
        Ok(())
    }

    /// Drops every filter bit.
    pub fn clear_filter(&mut self) {
        self.filter.clear();
    }

    /// Containment subtree of `id` collected with the filter switched off.
    fn subtree_unfiltered(&mut self, id: NodeId) -> Result<Vec<NodeId>> {
        self.require(id)?;
        let enabled = self.filter.is_enabled();
        self.filter.set_enabled(false);
        let mut collector = SubtreeCollector::default();
        let walked = Preorder::new().safe_mode(true).run_from(self, id, &mut collector);
        self.filter.set_enabled(enabled);
        walked?;
        Ok(collector.into_ids())
    }

    /// Writes the filter bits to `path`.
    pub fn save_filter(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        let state = self.filter.to_file(self.capacity());
        bincode::serialize_into(&mut writer, &state)?;
        writer.flush()?;
        tracing::debug!("filter saved: {} filtered of {}", state.filtered.len(), state.capacity);
        Ok(())
    }

    /// Replaces the filter bits with the ones stored at `path`.
    pub fn load_filter(&mut self, path: &Path) -> Result<()> {
        let reader = BufReader::new(File::open(path)?);
        let state: FilterFile = bincode::deserialize_from(reader)?;
        if state.capacity as usize != self.capacity() {
            return Err(AsgError::IncompatibleFile(format!(
                "filter was saved for {} ids, store has {}",
                state.capacity,
                self.capacity()
            )));
        }
        if let Some(bad) = state
            .filtered
            .iter()
            .find(|id| id.0 == 0 || id.index() >= self.capacity())
        {
            return Err(AsgError::IncompatibleFile(format!(
                "filter marks node {bad}, store has {} ids",
                self.capacity()
            )));
        }
        self.filter.clear();
        for id in state.filtered {
            self.filter.mark(id, true);
        }
        tracing::debug!("filter loaded: {} filtered", self.filter.count());
        Ok(())
    }
}

/// Borrowed view of one node that resolves strings and applies the filter.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    factory: &'a Factory,
    node: &'a Node,
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.node.id)
            .field("kind", &self.node.kind)
            .finish()
    }
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind
    }

    pub fn node(&self) -> &'a Node {
        self.node
    }

    pub fn factory(&self) -> &'a Factory {
        self.factory
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.node.parent
    }

    pub fn is_filtered(&self) -> bool {
        self.factory.is_filtered(self.node.id)
    }

    pub fn attr(&self, attr: AttrKind) -> Option<Value> {
        self.node
            .schema()
            .attr_slot(attr)
            .map(|slot| self.node.values[slot])
    }

    /// Resolved string attribute; `None` if the kind lacks it.
    pub fn str_attr(&self, attr: AttrKind) -> Option<&'a str> {
        let key = self.attr(attr)?.as_key()?;
        self.factory.strings.get(key)
    }

    pub fn name(&self) -> Option<&'a str> {
        self.str_attr(AttrKind::Name)
    }

    pub fn position(&self, pos: PosKind) -> Option<SourcePosition> {
        self.node
            .schema()
            .position_slot(pos)
            .map(|slot| self.node.positions[slot])
    }

    pub fn annotations(&self) -> &'a AttributeList {
        &self.node.annotations
    }

    /// Single edge target; `None` when unset, filtered or undeclared.
    pub fn edge(&self, edge: EdgeKind) -> Option<NodeId> {
        let slot = self.node.schema().single_slot(edge)?;
        self.node.singles[slot].filter(|t| !self.factory.is_filtered(*t))
    }

    /// Multi edge targets; empty when undeclared.
    pub fn edges(self, edge: EdgeKind) -> impl Iterator<Item = NodeId> + use<'a> {
        let factory = self.factory;
        let node = self.node;
        let targets: &'a [NodeId] = match node.schema().multi_slot(edge) {
            Some(slot) => &node.multis[slot],
            None => &[],
        };
        targets
            .iter()
            .copied()
            .filter(move |t| !factory.is_filtered(*t))
    }

    /// Every unfiltered outgoing edge in schema order.
    pub fn out_edges(self) -> impl Iterator<Item = (EdgeKind, NodeId)> + use<'a> {
        let node = self;
        let schema = self.node.schema();
        let singles = schema
            .singles
            .iter()
            .filter_map(move |&e| node.edge(e).map(|t| (e, t)));
        let multis = schema
            .multis
            .iter()
            .flat_map(move |&e| node.edges(e).map(move |t| (e, t)));
        singles.chain(multis)
    }
}
