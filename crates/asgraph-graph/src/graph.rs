//! Graph wrapper using petgraph::StableDiGraph with uid lookup and
//! reverse-pair bookkeeping.

use crate::error::{GraphError, Result};
use crate::model::*;
use asgraph_core::{Attribute, AttributeList, Key, StrTable};
use petgraph::Direction as Flow;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

/// Type given to nodes that are only known as edge targets while loading.
pub const PLACEHOLDER_TYPE: &str = "__INVALID__";

/// A directed multigraph keyed by caller-chosen uids.
pub struct Graph {
    inner: StableDiGraph<GraphNode, GraphEdge>,
    strings: StrTable,
    uids: HashMap<Key, NodeIndex>,
    pairs: HashMap<EdgeIndex, EdgeIndex>,
    header: Vec<(Key, Key)>,
    // petgraph reuses freed slots; handles map through these instead.
    node_slots: HashMap<NodeId, NodeIndex>,
    edge_slots: HashMap<EdgeId, EdgeIndex>,
    next_node: u32,
    next_edge: u32,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::with_strings(StrTable::new())
    }

    pub(crate) fn with_strings(strings: StrTable) -> Self {
        Graph {
            inner: StableDiGraph::new(),
            strings,
            uids: HashMap::new(),
            pairs: HashMap::new(),
            header: Vec::new(),
            node_slots: HashMap::new(),
            edge_slots: HashMap::new(),
            next_node: 0,
            next_edge: 0,
        }
    }

    fn nidx(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_slots.get(&id).copied()
    }

    fn eidx(&self, id: EdgeId) -> Option<EdgeIndex> {
        self.edge_slots.get(&id).copied()
    }

    fn node_id(&self, idx: NodeIndex) -> NodeId {
        self.inner[idx].id
    }

    fn edge_id(&self, idx: EdgeIndex) -> EdgeId {
        self.inner[idx].id
    }

    pub fn strings(&self) -> &StrTable {
        &self.strings
    }

    pub(crate) fn strings_mut(&mut self) -> &mut StrTable {
        &mut self.strings
    }

    pub fn intern(&mut self, s: &str) -> Key {
        self.strings.set(s)
    }

    /// Removes every node, edge and header entry. Interned strings stay,
    /// and so do the id counters.
    pub fn clear(&mut self) {
        self.inner.clear();
        self.uids.clear();
        self.pairs.clear();
        self.header.clear();
        self.node_slots.clear();
        self.edge_slots.clear();
    }

    // ── Header ───────────────────────────────────────────

    pub fn set_header_info(&mut self, key: &str, value: &str) {
        let key = self.strings.set(key);
        let value = self.strings.set(value);
        self.set_header_keys(key, value);
    }

    pub(crate) fn set_header_keys(&mut self, key: Key, value: Key) {
        match self.header.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.header.push((key, value)),
        }
    }

    pub fn header_info(&self, key: &str) -> Option<&str> {
        let key = self.strings.lookup(key)?;
        let (_, value) = self.header.iter().find(|(k, _)| *k == key)?;
        self.strings.get(*value)
    }

    pub fn remove_header_info(&mut self, key: &str) -> bool {
        let Some(key) = self.strings.lookup(key) else {
            return false;
        };
        let before = self.header.len();
        self.header.retain(|(k, _)| *k != key);
        before != self.header.len()
    }

    /// Header entries in insertion order.
    pub fn header_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.header.iter().map(move |(k, v)| {
            (
                self.strings.get(*k).unwrap_or_default(),
                self.strings.get(*v).unwrap_or_default(),
            )
        })
    }

    pub(crate) fn header_keys(&self) -> &[(Key, Key)] {
        &self.header
    }

    // ── Nodes ────────────────────────────────────────────

    /// Creates a node. Fails if `uid` is taken or empty.
    pub fn create_node(&mut self, uid: &str, node_type: &str) -> Result<NodeId> {
        if uid.is_empty() {
            return Err(GraphError::EmptyUid);
        }
        if self.find_node(uid).is_some() {
            return Err(GraphError::NodeAlreadyExists(uid.to_owned()));
        }
        let uid = self.strings.set(uid);
        let node_type = self.strings.set(node_type);
        let idx = self.add_node_keyed(uid, node_type);
        Ok(self.node_id(idx))
    }

    pub(crate) fn add_node_keyed(&mut self, uid: Key, node_type: Key) -> NodeIndex {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        let idx = self.inner.add_node(GraphNode {
            id,
            uid,
            node_type,
            attributes: AttributeList::new(),
        });
        self.uids.insert(uid, idx);
        self.node_slots.insert(id, idx);
        idx
    }

    pub(crate) fn node_by_key(&self, uid: Key) -> Option<NodeIndex> {
        self.uids.get(&uid).copied()
    }

    pub(crate) fn node_by_index(&self, idx: NodeIndex) -> Option<&GraphNode> {
        self.inner.node_weight(idx)
    }

    pub(crate) fn set_node_type_key(&mut self, idx: NodeIndex, node_type: Key) {
        if let Some(node) = self.inner.node_weight_mut(idx) {
            node.node_type = node_type;
        }
    }

    pub(crate) fn set_node_attributes(&mut self, idx: NodeIndex, attributes: AttributeList) {
        if let Some(node) = self.inner.node_weight_mut(idx) {
            node.attributes = attributes;
        }
    }

    pub(crate) fn set_edge_attributes(&mut self, idx: EdgeIndex, attributes: AttributeList) {
        if let Some(edge) = self.inner.edge_weight_mut(idx) {
            edge.attributes = attributes;
        }
    }

    pub fn find_node(&self, uid: &str) -> Option<NodeId> {
        let key = self.strings.lookup(uid)?;
        self.node_by_key(key).map(|idx| self.node_id(idx))
    }

    pub fn node_exists(&self, uid: &str) -> bool {
        self.find_node(uid).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.inner.node_weight(self.nidx(id)?)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode> {
        let idx = self.nidx(id)?;
        self.inner.node_weight_mut(idx)
    }

    pub fn uid(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(|n| self.strings.get(n.uid))
    }

    pub fn node_type(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(|n| self.strings.get(n.node_type))
    }

    pub fn set_node_type(&mut self, id: NodeId, node_type: &str) -> Result<()> {
        let key = self.strings.set(node_type);
        let node = self.node_mut(id).ok_or_else(|| GraphError::NoSuchNode(id.to_string()))?;
        node.node_type = key;
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Node ids in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut ids: Vec<NodeId> = self.node_slots.keys().copied().collect();
        ids.sort();
        ids.into_iter()
    }

    pub fn find_nodes_by_type(&self, node_type: &str) -> Vec<NodeId> {
        let Some(key) = self.strings.lookup(node_type) else {
            return Vec::new();
        };
        self.nodes()
            .filter(|&id| self.node(id).is_some_and(|n| n.node_type == key))
            .collect()
    }

    /// Deletes `id`, its edges, and every node reachable from it over
    /// non-reverse edges that no surviving node can still reach. Cycles
    /// among the descendants do not keep them alive.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        let Some(start) = self.nidx(id) else {
            return false;
        };
        let doomed = self.descendants(start);

        // Descendants still reachable from outside, not passing through `start`.
        let mut kept = HashSet::new();
        let mut worklist: Vec<NodeIndex> = doomed
            .iter()
            .copied()
            .filter(|&n| n != start)
            .filter(|&n| {
                self.inner
                    .edges_directed(n, Flow::Incoming)
                    .any(|e| e.weight().direction != Direction::Reverse && !doomed.contains(&e.source()))
            })
            .collect();
        while let Some(n) = worklist.pop() {
            if !kept.insert(n) {
                continue;
            }
            worklist.extend(self.owned(n).filter(|t| *t != start && doomed.contains(t)));
        }

        let mut deleted = 0usize;
        for idx in doomed.into_iter().filter(|n| !kept.contains(n)) {
            self.remove_node_raw(idx);
            deleted += 1;
        }
        tracing::debug!("deleted {deleted} nodes starting at {id}");
        true
    }

    fn descendants(&self, start: NodeIndex) -> HashSet<NodeIndex> {
        let mut seen = HashSet::from([start]);
        let mut worklist = vec![start];
        while let Some(n) = worklist.pop() {
            for t in self.owned(n) {
                if seen.insert(t) {
                    worklist.push(t);
                }
            }
        }
        seen
    }

    /// Targets of the non-reverse edges leaving `idx`.
    fn owned(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.inner
            .edges_directed(idx, Flow::Outgoing)
            .filter(|e| e.weight().direction != Direction::Reverse)
            .map(|e| e.target())
    }

    /// Deletes every node of `node_type` without cascading.
    pub fn delete_nodes_by_type(&mut self, node_type: &str) -> usize {
        let doomed = self.find_nodes_by_type(node_type);
        for id in &doomed {
            if let Some(idx) = self.nidx(*id) {
                self.remove_node_raw(idx);
            }
        }
        doomed.len()
    }

    fn remove_node_raw(&mut self, idx: NodeIndex) {
        let incident: Vec<EdgeIndex> = self
            .inner
            .edges_directed(idx, Flow::Outgoing)
            .chain(self.inner.edges_directed(idx, Flow::Incoming))
            .map(|e| e.id())
            .collect();
        for e in incident {
            let id = self.edge_id(e);
            self.unpair(e);
            self.edge_slots.remove(&id);
        }
        if let Some(node) = self.inner.remove_node(idx) {
            self.uids.remove(&node.uid);
            self.node_slots.remove(&node.id);
        }
    }

    // ── Edges ────────────────────────────────────────────

    /// Adds `from -> to`. With `create_reverse`, also adds the `Reverse`
    /// edge `to -> from` and pairs the two.
    pub fn create_directed_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        edge_type: &str,
        create_reverse: bool,
    ) -> Result<EdgeId> {
        let (from, to) = (self.require(from)?, self.require(to)?);
        let ty = self.strings.set(edge_type);
        let e = self.add_edge_keyed(from, to, ty, Direction::Directional);
        if create_reverse {
            let r = self.add_edge_keyed(to, from, ty, Direction::Reverse);
            self.pair(e, r);
        }
        Ok(self.edge_id(e))
    }

    /// Adds a two-way edge as two paired `Bidirectional` halves and
    /// returns the `from -> to` half.
    pub fn create_bidirected_edge(&mut self, from: NodeId, to: NodeId, edge_type: &str) -> Result<EdgeId> {
        let (from, to) = (self.require(from)?, self.require(to)?);
        let ty = self.strings.set(edge_type);
        let (e, _) = self.add_bidirected_keyed(from, to, ty);
        Ok(self.edge_id(e))
    }

    /// [`Graph::create_directed_edge`] addressed by uid.
    pub fn create_directed_edge_by_uid(
        &mut self,
        from: &str,
        to: &str,
        edge_type: &str,
        create_reverse: bool,
    ) -> Result<EdgeId> {
        let from = self
            .find_node(from)
            .ok_or_else(|| GraphError::NoSuchNode(from.to_owned()))?;
        let to = self
            .find_node(to)
            .ok_or_else(|| GraphError::NoSuchNode(to.to_owned()))?;
        self.create_directed_edge(from, to, edge_type, create_reverse)
    }

    pub(crate) fn add_edge_keyed(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        edge_type: Key,
        direction: Direction,
    ) -> EdgeIndex {
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        let idx = self.inner.add_edge(
            from,
            to,
            GraphEdge {
                id,
                edge_type,
                direction,
                attributes: AttributeList::new(),
            },
        );
        self.edge_slots.insert(id, idx);
        idx
    }

    pub(crate) fn add_bidirected_keyed(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        edge_type: Key,
    ) -> (EdgeIndex, EdgeIndex) {
        let e = self.add_edge_keyed(from, to, edge_type, Direction::Bidirectional);
        let r = self.add_edge_keyed(to, from, edge_type, Direction::Bidirectional);
        self.pair(e, r);
        (e, r)
    }

    pub(crate) fn pair(&mut self, a: EdgeIndex, b: EdgeIndex) {
        self.pairs.insert(a, b);
        self.pairs.insert(b, a);
    }

    /// Turns `edge` and its pair, if any, into a bidirectional pair.
    pub(crate) fn make_bidirectional(&mut self, edge: EdgeId) {
        let Some(idx) = self.eidx(edge) else { return };
        match self.pairs.get(&idx).copied() {
            Some(p) => self.inner[p].direction = Direction::Bidirectional,
            None => {
                let Some((from, to)) = self.inner.edge_endpoints(idx) else { return };
                let ty = self.inner[idx].edge_type;
                let r = self.add_edge_keyed(to, from, ty, Direction::Bidirectional);
                self.pair(idx, r);
            }
        }
        self.inner[idx].direction = Direction::Bidirectional;
    }

    /// Gives an unpaired directional `edge` its `Reverse` edge.
    pub(crate) fn add_reverse_pair(&mut self, edge: EdgeId) {
        let Some(idx) = self.eidx(edge) else { return };
        if self.pairs.contains_key(&idx) || self.inner[idx].direction != Direction::Directional {
            return;
        }
        let Some((from, to)) = self.inner.edge_endpoints(idx) else { return };
        let ty = self.inner[idx].edge_type;
        let r = self.add_edge_keyed(to, from, ty, Direction::Reverse);
        self.pair(idx, r);
    }

    fn unpair(&mut self, e: EdgeIndex) {
        if let Some(p) = self.pairs.remove(&e) {
            self.pairs.remove(&p);
        }
    }

    pub fn reverse_pair(&self, edge: EdgeId) -> Option<EdgeId> {
        let pair = self.pairs.get(&self.eidx(edge)?)?;
        Some(self.edge_id(*pair))
    }

    pub fn has_reverse_pair(&self, edge: EdgeId) -> bool {
        self.reverse_pair(edge).is_some()
    }

    pub fn edge(&self, edge: EdgeId) -> Option<&GraphEdge> {
        self.inner.edge_weight(self.eidx(edge)?)
    }

    /// `(from, to)` of an edge.
    pub fn edge_endpoints(&self, edge: EdgeId) -> Option<(NodeId, NodeId)> {
        let (a, b) = self.inner.edge_endpoints(self.eidx(edge)?)?;
        Some((self.node_id(a), self.node_id(b)))
    }

    pub fn edge_source(&self, edge: EdgeId) -> Option<NodeId> {
        self.edge_endpoints(edge).map(|(from, _)| from)
    }

    pub fn edge_target(&self, edge: EdgeId) -> Option<NodeId> {
        self.edge_endpoints(edge).map(|(_, to)| to)
    }

    pub fn edge_type(&self, edge: EdgeId) -> Option<EdgeType> {
        let e = self.edge(edge)?;
        let name = self.strings.get(e.edge_type)?;
        Some(EdgeType::new(name, e.direction))
    }

    /// Outgoing edges in creation order.
    pub fn out_edges(&self, node: NodeId) -> Vec<EdgeId> {
        self.directed(node, Flow::Outgoing)
    }

    /// Incoming edges in creation order.
    pub fn in_edges(&self, node: NodeId) -> Vec<EdgeId> {
        self.directed(node, Flow::Incoming)
    }

    fn directed(&self, node: NodeId, flow: Flow) -> Vec<EdgeId> {
        let Some(idx) = self.nidx(node) else {
            return Vec::new();
        };
        let mut edges: Vec<EdgeId> = self.inner.edges_directed(idx, flow).map(|e| e.weight().id).collect();
        edges.sort();
        edges
    }

    /// Outgoing edges whose type is in `types`.
    pub fn find_out_edges(&self, node: NodeId, types: &[EdgeType]) -> Vec<EdgeId> {
        let wanted = self.type_keys(types);
        self.out_edges(node)
            .into_iter()
            .filter(|&e| self.edge_matches(e, &wanted))
            .collect()
    }

    pub(crate) fn type_keys(&self, types: &[EdgeType]) -> HashSet<(Key, Direction)> {
        types
            .iter()
            .filter_map(|t| self.strings.lookup(&t.name).map(|k| (k, t.direction)))
            .collect()
    }

    pub(crate) fn edge_matches(&self, edge: EdgeId, wanted: &HashSet<(Key, Direction)>) -> bool {
        self.edge(edge)
            .is_some_and(|e| wanted.contains(&(e.edge_type, e.direction)))
    }

    /// Removes an edge together with its reverse pair.
    pub fn delete_edge(&mut self, edge: EdgeId) -> bool {
        let Some(idx) = self.eidx(edge) else {
            return false;
        };
        if let Some(p) = self.pairs.remove(&idx) {
            self.pairs.remove(&p);
            if let Some(pair) = self.inner.remove_edge(p) {
                self.edge_slots.remove(&pair.id);
            }
        }
        self.inner.remove_edge(idx);
        self.edge_slots.remove(&edge);
        true
    }

    /// Removes every edge `from -> to` and their pairs.
    pub fn delete_edges_between(&mut self, from: NodeId, to: NodeId) -> usize {
        let doomed: Vec<EdgeId> = self
            .out_edges(from)
            .into_iter()
            .filter(|&e| self.edge_target(e) == Some(to))
            .collect();
        doomed.into_iter().filter(|&e| self.delete_edge(e)).count()
    }

    /// Removes every edge of the given type and direction, with pairs.
    pub fn delete_edges_of_type(&mut self, edge_type: &EdgeType) -> usize {
        let wanted = self.type_keys(std::slice::from_ref(edge_type));
        let mut doomed: Vec<EdgeId> = self
            .edge_slots
            .keys()
            .copied()
            .filter(|&e| self.edge_matches(e, &wanted))
            .collect();
        doomed.sort();
        doomed.into_iter().filter(|&e| self.delete_edge(e)).count()
    }

    /// Nodes without an incoming edge of the given types.
    pub fn roots(&self, types: &[EdgeType]) -> Vec<NodeId> {
        let wanted = self.type_keys(types);
        self.nodes()
            .filter(|&n| !self.in_edges(n).into_iter().any(|e| self.edge_matches(e, &wanted)))
            .collect()
    }

    /// Nodes without an outgoing edge of the given types.
    pub fn leaves(&self, types: &[EdgeType]) -> Vec<NodeId> {
        let wanted = self.type_keys(types);
        self.nodes()
            .filter(|&n| !self.out_edges(n).into_iter().any(|e| self.edge_matches(e, &wanted)))
            .collect()
    }

    fn require(&self, id: NodeId) -> Result<NodeIndex> {
        self.nidx(id).ok_or_else(|| GraphError::NoSuchNode(id.to_string()))
    }

    // ── Attributes ───────────────────────────────────────

    pub fn int_attribute(&mut self, name: &str, context: &str, value: i32) -> Attribute {
        Attribute::int(self.strings.set(name), self.strings.set(context), value)
    }

    pub fn float_attribute(&mut self, name: &str, context: &str, value: f32) -> Attribute {
        Attribute::float(self.strings.set(name), self.strings.set(context), value)
    }

    pub fn string_attribute(&mut self, name: &str, context: &str, value: &str) -> Attribute {
        let value = self.strings.set(value);
        Attribute::string(self.strings.set(name), self.strings.set(context), value)
    }

    pub fn composite_attribute(&mut self, name: &str, context: &str) -> Attribute {
        Attribute::composite(self.strings.set(name), self.strings.set(context))
    }

    pub fn node_attributes(&self, node: NodeId) -> Option<&AttributeList> {
        self.node(node).map(|n| &n.attributes)
    }

    pub fn node_attributes_mut(&mut self, node: NodeId) -> Result<&mut AttributeList> {
        self.node_mut(node)
            .map(|n| &mut n.attributes)
            .ok_or_else(|| GraphError::NoSuchNode(node.to_string()))
    }

    pub fn edge_attributes(&self, edge: EdgeId) -> Option<&AttributeList> {
        self.edge(edge).map(|e| &e.attributes)
    }

    pub fn edge_attributes_mut(&mut self, edge: EdgeId) -> Result<&mut AttributeList> {
        let idx = self.eidx(edge).ok_or(GraphError::NoSuchEdge(edge))?;
        self.inner
            .edge_weight_mut(idx)
            .map(|e| &mut e.attributes)
            .ok_or(GraphError::NoSuchEdge(edge))
    }

    /// Shorthand for attaching one attribute to a node.
    pub fn add_node_attribute(&mut self, node: NodeId, attr: Attribute) -> Result<()> {
        self.node_attributes_mut(node)?.add(attr);
        Ok(())
    }

    pub fn add_edge_attribute(&mut self, edge: EdgeId, attr: Attribute) -> Result<()> {
        self.edge_attributes_mut(edge)?.add(attr);
        Ok(())
    }
}
