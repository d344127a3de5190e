//! Merging one graph into another, matched by node uid.
//!
//! Nodes and edges missing from the target are copied over. For elements
//! found in both, [`MergeOptions`] decides what happens to the two
//! attribute lists. An edge matches when it joins the same uids with the
//! same type name; `Reverse` edges only travel with their partner.

use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::model::{Direction, EdgeId, EdgeType, NodeId};
use asgraph_core::{Attribute, AttributeList, AttributeValue};
use std::collections::HashSet;
use std::path::Path;

/// Fate of the attributes of an element present in both graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// The incoming list replaces the old one.
    DropOld,
    /// The old list stays as it is.
    DropNew,
    /// Combine attribute by attribute.
    #[default]
    Union,
}

/// Union rule for string and composite attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMerge {
    /// Incoming attribute replaces old ones with its type, name and context.
    DropOld,
    /// Incoming attribute is added only if no old one shares its type,
    /// name and context.
    DropNew,
    AddAll,
    /// Added unless an equal attribute is already present.
    #[default]
    UnionNew,
}

/// Union rule for int and float attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericMerge {
    DropOld,
    DropNew,
    AddAll,
    /// Adds the incoming value to the first matching old attribute.
    #[default]
    Sum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttributeMerge {
    pub mode: MergeMode,
    pub text: TextMerge,
    pub numeric: NumericMerge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOptions {
    pub nodes: AttributeMerge,
    pub edges: AttributeMerge,
}

impl AttributeMerge {
    /// Folds `incoming` into `old`. Both lists must use the same strings.
    pub fn apply(&self, old: &mut AttributeList, incoming: &AttributeList) {
        match self.mode {
            MergeMode::DropNew => {}
            MergeMode::DropOld => *old = incoming.clone(),
            MergeMode::Union => {
                for attr in incoming {
                    self.union_one(old, attr);
                }
            }
        }
    }

    fn union_one(&self, old: &mut AttributeList, attr: &Attribute) {
        let (kind, name, context) = (attr.kind(), attr.name, attr.context);
        let numeric = matches!(attr.value, AttributeValue::Int(_) | AttributeValue::Float(_));
        if numeric {
            match self.numeric {
                NumericMerge::AddAll => old.add(attr.clone()),
                NumericMerge::DropOld => {
                    old.remove_all(kind, name, context);
                    old.add(attr.clone());
                }
                NumericMerge::DropNew => {
                    if old.find(kind, name, context).is_none() {
                        old.add(attr.clone());
                    }
                }
                NumericMerge::Sum => match old.find_mut(kind, name, context) {
                    Some(existing) => add_value(existing, attr),
                    None => old.add(attr.clone()),
                },
            }
        } else {
            match self.text {
                TextMerge::AddAll => old.add(attr.clone()),
                TextMerge::DropOld => {
                    old.remove_all(kind, name, context);
                    old.add(attr.clone());
                }
                TextMerge::DropNew => {
                    if old.find(kind, name, context).is_none() {
                        old.add(attr.clone());
                    }
                }
                TextMerge::UnionNew => {
                    if !old.iter().any(|a| a == attr) {
                        old.add(attr.clone());
                    }
                }
            }
        }
    }
}

fn add_value(existing: &mut Attribute, extra: &Attribute) {
    match (&mut existing.value, &extra.value) {
        (AttributeValue::Int(a), AttributeValue::Int(b)) => *a = a.saturating_add(*b),
        (AttributeValue::Float(a), AttributeValue::Float(b)) => *a += *b,
        _ => {}
    }
}

impl Graph {
    /// Folds `other` into this graph. Header entries of `other` win.
    pub fn merge(&mut self, other: &Graph, options: &MergeOptions) -> Result<()> {
        for node in other.nodes() {
            self.merge_node(other, node, &options.nodes)?;
        }

        let mut handled: HashSet<EdgeId> = HashSet::new();
        for node in other.nodes() {
            for edge in other.out_edges(node) {
                if !handled.insert(edge) {
                    continue;
                }
                let Some(ty) = other.edge_type(edge) else { continue };
                if ty.direction == Direction::Reverse {
                    continue;
                }
                let pair = other.reverse_pair(edge);
                if let Some(p) = pair {
                    handled.insert(p);
                }
                self.merge_edge(other, edge, pair, &ty, &options.edges)?;
            }
        }

        for (key, value) in other.header_entries() {
            self.set_header_info(key, value);
        }
        tracing::debug!(
            "merged {} nodes and {} edges, now {} nodes and {} edges",
            other.node_count(),
            other.edge_count(),
            self.node_count(),
            self.edge_count()
        );
        Ok(())
    }

    /// Loads a binary graph file and merges it in.
    pub fn merge_binary(&mut self, path: &Path, options: &MergeOptions) -> Result<()> {
        let other = Graph::load_binary(path)?;
        self.merge(&other, options)
    }

    /// A fresh graph with the same content. Ids are renumbered from zero
    /// in creation order, so handles into `self` do not carry over.
    pub fn copy_graph(&self) -> Result<Graph> {
        let mut copy = Graph::with_strings(self.strings().clone());
        copy.merge(self, &MergeOptions::default())?;
        Ok(copy)
    }

    fn merge_node(&mut self, other: &Graph, node: NodeId, rule: &AttributeMerge) -> Result<()> {
        let Some(data) = other.node(node) else {
            return Ok(());
        };
        let uid = other.strings().resolve(data.uid)?;
        let node_type = other.strings().resolve(data.node_type)?;
        let attrs = data.attributes.translate(other.strings(), self.strings_mut())?;
        match self.find_node(uid) {
            Some(id) => rule.apply(self.node_attributes_mut(id)?, &attrs),
            None => {
                let id = self.create_node(uid, node_type)?;
                *self.node_attributes_mut(id)? = attrs;
            }
        }
        Ok(())
    }

    fn merge_edge(
        &mut self,
        other: &Graph,
        edge: EdgeId,
        pair: Option<EdgeId>,
        ty: &EdgeType,
        rule: &AttributeMerge,
    ) -> Result<()> {
        let Some((from, to)) = other.edge_endpoints(edge) else {
            return Ok(());
        };
        let from = self.counterpart(other, from)?;
        let to = self.counterpart(other, to)?;
        let attrs = match other.edge_attributes(edge) {
            Some(list) => list.translate(other.strings(), self.strings_mut())?,
            None => AttributeList::new(),
        };
        let pair_attrs = match pair.and_then(|p| other.edge_attributes(p)) {
            Some(list) => Some(list.translate(other.strings(), self.strings_mut())?),
            None => None,
        };

        let existing = self.out_edges(from).into_iter().find(|&e| {
            self.edge_target(e) == Some(to)
                && self
                    .edge_type(e)
                    .is_some_and(|t| t.name == ty.name && t.direction != Direction::Reverse)
        });
        match existing {
            None => {
                let e = match ty.direction {
                    Direction::Bidirectional => self.create_bidirected_edge(from, to, &ty.name)?,
                    _ => self.create_directed_edge(from, to, &ty.name, pair.is_some())?,
                };
                *self.edge_attributes_mut(e)? = attrs;
                if let (Some(list), Some(p)) = (pair_attrs, self.reverse_pair(e)) {
                    *self.edge_attributes_mut(p)? = list;
                }
            }
            Some(e) => {
                match ty.direction {
                    Direction::Bidirectional => self.make_bidirectional(e),
                    _ if pair.is_some() => self.add_reverse_pair(e),
                    _ => {}
                }
                rule.apply(self.edge_attributes_mut(e)?, &attrs);
                if let (Some(list), Some(p)) = (pair_attrs, self.reverse_pair(e)) {
                    rule.apply(self.edge_attributes_mut(p)?, &list);
                }
            }
        }
        Ok(())
    }

    /// The node of this graph with the uid `node` has in `other`.
    fn counterpart(&self, other: &Graph, node: NodeId) -> Result<NodeId> {
        let uid = other.uid(node).ok_or_else(|| GraphError::NoSuchNode(node.to_string()))?;
        self.find_node(uid).ok_or_else(|| GraphError::NoSuchNode(uid.to_owned()))
    }
}
