//! Binary save/load of a [`Graph`].
//!
//! ```text
//! string table
//! header: count:u32 (key:u32 value:u32)*
//! node*:  uid:u32 type:u32 attributes
//!         edge*: type:u32 direction:u32 target-uid:u32 has-pair:u8
//!                attributes [pair attributes]
//!         0 0 0
//! 0 0
//! ```
//!
//! `Reverse` edges are never written; they come back through the
//! has-pair flag of their `Directional` partner. Only one half of a
//! bidirectional pair is written.

use crate::error::{GraphError, Result};
use crate::graph::{Graph, PLACEHOLDER_TYPE};
use crate::model::Direction;
use asgraph_core::{AttributeList, BinaryReader, BinaryWriter, CodecError, Key, StrTable};
use petgraph::stable_graph::NodeIndex;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

impl Graph {
    pub fn save_binary(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let written = save_to(self, BufWriter::new(file))?;
        tracing::debug!("graph saved to {} ({} bytes)", path.display(), written);
        Ok(())
    }

    pub fn load_binary(path: &Path) -> Result<Graph> {
        let file = File::open(path)?;
        let graph = load_from(BufReader::new(file))?;
        tracing::debug!(
            "graph loaded from {}: {} nodes, {} edges",
            path.display(),
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

/// Serializes `graph` into `sink`, returning the byte count.
pub fn save_to<W: Write>(graph: &Graph, sink: W) -> Result<u64> {
    let mut w = BinaryWriter::new(sink);
    graph.strings().save(&mut w)?;

    let header = graph.header_keys();
    w.write(header.len() as u32)?;
    for (k, v) in header {
        w.write(k.0)?;
        w.write(v.0)?;
    }

    let mut saved = HashSet::new();
    for node in graph.nodes() {
        let Some(data) = graph.node(node) else { continue };
        w.write(data.uid.0)?;
        w.write(data.node_type.0)?;
        data.attributes.write(&mut w)?;

        for edge in graph.out_edges(node) {
            let Some(e) = graph.edge(edge) else { continue };
            if e.direction == Direction::Reverse || saved.contains(&edge) {
                continue;
            }
            let Some(target) = graph.edge_target(edge).and_then(|t| graph.node(t)) else {
                continue;
            };
            let pair = graph.reverse_pair(edge);
            w.write(e.edge_type.0)?;
            w.write(e.direction as u32)?;
            w.write(target.uid.0)?;
            w.write_bool(pair.is_some())?;
            e.attributes.write(&mut w)?;
            if let Some(pair) = pair {
                let attrs = graph.edge_attributes(pair).cloned().unwrap_or_default();
                attrs.write(&mut w)?;
                saved.insert(pair);
            }
        }
        w.write(0u32)?;
        w.write(0u32)?;
        w.write(0u32)?;
    }
    w.write(0u32)?;
    w.write(0u32)?;
    w.flush()?;
    Ok(w.written())
}

/// Deserializes a graph. Any decoding error, or an edge target that never
/// gets its own node record, aborts the load.
pub fn load_from<R: Read>(source: R) -> Result<Graph> {
    let mut r = BinaryReader::new(source);
    let strings = StrTable::load(&mut r)?;
    let mut graph = Graph::with_strings(strings);
    let placeholder = graph.intern(PLACEHOLDER_TYPE);

    let count = r.read::<u32>()?;
    for _ in 0..count {
        let key = read_key(&mut r, &graph)?;
        let value = read_key(&mut r, &graph)?;
        graph.set_header_keys(key, value);
    }

    let mut pending: HashSet<NodeIndex> = HashSet::new();
    loop {
        let uid = read_key(&mut r, &graph)?;
        let node_type = read_key(&mut r, &graph)?;
        if uid.is_empty() {
            if !node_type.is_empty() {
                return Err(CodecError::malformed("node record without uid").into());
            }
            break;
        }
        let from = match graph.node_by_key(uid) {
            Some(idx) if pending.remove(&idx) => {
                graph.set_node_type_key(idx, node_type);
                idx
            }
            Some(_) => {
                let uid = graph.strings().resolve(uid)?.to_owned();
                return Err(GraphError::NodeAlreadyExists(uid));
            }
            None => graph.add_node_keyed(uid, node_type),
        };
        let attrs = AttributeList::read(&mut r)?;
        attrs.check_keys(graph.strings())?;
        graph.set_node_attributes(from, attrs);

        loop {
            let edge_type = read_key(&mut r, &graph)?;
            let direction = r.read::<u32>()?;
            let target_uid = read_key(&mut r, &graph)?;
            if edge_type.is_empty() && direction == 0 && target_uid.is_empty() {
                break;
            }
            if target_uid.is_empty() {
                return Err(CodecError::malformed("edge without target").into());
            }
            let direction = Direction::from_u32(direction)
                .filter(|d| *d != Direction::Reverse)
                .ok_or_else(|| CodecError::malformed(format!("bad edge direction {direction}")))?;
            let to = match graph.node_by_key(target_uid) {
                Some(idx) => idx,
                None => {
                    let idx = graph.add_node_keyed(target_uid, placeholder);
                    pending.insert(idx);
                    idx
                }
            };
            let has_pair = r.read_bool()?;
            let attrs = AttributeList::read(&mut r)?;
            attrs.check_keys(graph.strings())?;

            let (edge, pair) = match direction {
                Direction::Bidirectional => {
                    let (e, p) = graph.add_bidirected_keyed(from, to, edge_type);
                    (e, Some(p))
                }
                _ => {
                    let e = graph.add_edge_keyed(from, to, edge_type, Direction::Directional);
                    if has_pair {
                        let p = graph.add_edge_keyed(to, from, edge_type, Direction::Reverse);
                        graph.pair(e, p);
                        (e, Some(p))
                    } else {
                        (e, None)
                    }
                }
            };
            graph.set_edge_attributes(edge, attrs);
            if has_pair {
                let pair_attrs = AttributeList::read(&mut r)?;
                pair_attrs.check_keys(graph.strings())?;
                if let Some(p) = pair {
                    graph.set_edge_attributes(p, pair_attrs);
                }
            }
        }
    }

    if let Some(&idx) = pending.iter().next() {
        let uid = graph
            .node_by_index(idx)
            .and_then(|n| graph.strings().get(n.uid))
            .unwrap_or_default()
            .to_owned();
        return Err(CodecError::malformed(format!("edge target {uid:?} has no node record")).into());
    }
    Ok(graph)
}

fn read_key<R: Read>(r: &mut BinaryReader<R>, graph: &Graph) -> Result<Key> {
    let key = Key(r.read::<u32>()?);
    graph.strings().resolve(key)?;
    Ok(key)
}
