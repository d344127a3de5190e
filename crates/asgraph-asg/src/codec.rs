//! Binary save/load of a whole [`Factory`].
//!
//! Layout:
//!
//! ```text
//! "ASGRAPH\0" version:u32
//! string table
//! header: count:u32 (key:u32 value:u32)*
//! capacity:u32
//! node*:  id:u32 kind:u16 attrs positions singles multis 0 annotations
//! 0:u32 0:u16
//! ```
//!
//! Attributes, positions and edges follow the kind's schema order. A
//! single edge is one id (`0` when unset or filtered), a multi edge is a
//! run of ids closed by `0`, and the edge section ends with one more `0`.
//! Node ids are written in increasing order and stay below `capacity`.

use crate::error::{AsgError, Result};
use crate::factory::Factory;
use crate::header::Header;
use crate::node::{NodeId, SourcePosition, Value};
use crate::schema::{EdgeKind, NodeKind, ScalarType};
use asgraph_core::{AttributeList, BinaryReader, BinaryWriter, CodecError, Key, StrTable};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub const MAGIC: &[u8; 8] = b"ASGRAPH\0";
pub const FORMAT_VERSION: u32 = 1;

impl Factory {
    /// Writes the store to `path`. With the filter enabled, filtered
    /// nodes and edges to them are left out.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let written = save_to(self, BufWriter::new(file))?;
        tracing::debug!("saved {} ({} bytes)", path.display(), written);
        Ok(())
    }

    /// Loads a store written by [`Factory::save`].
    pub fn load(path: &Path) -> Result<Factory> {
        let file = File::open(path)?;
        let factory = load_from(BufReader::new(file))?;
        tracing::debug!("loaded {}: {} nodes", path.display(), factory.len());
        Ok(factory)
    }
}

/// Serializes `factory` into `sink`, returning the byte count.
pub fn save_to<W: Write>(factory: &Factory, sink: W) -> Result<u64> {
    let mut w = BinaryWriter::new(sink);
    w.write_bytes(MAGIC)?;
    w.write(FORMAT_VERSION)?;

    let mut strings = factory.strings().clone();
    let header: Vec<(Key, Key)> = factory
        .header()
        .iter()
        .map(|(k, v)| (strings.set(k), strings.set(v)))
        .collect();
    strings.save(&mut w)?;
    w.write(header.len() as u32)?;
    for (k, v) in header {
        w.write(k.0)?;
        w.write(v.0)?;
    }
    w.write(factory.capacity() as u32)?;

    let mut count = 0usize;
    for node in factory.iter_all() {
        if factory.is_filtered(node.id) {
            continue;
        }
        write_node(factory, node.id, &mut w)?;
        count += 1;
    }
    w.write(0u32)?;
    w.write(0u16)?;
    w.flush()?;
    tracing::debug!("wrote {count} node records");
    Ok(w.written())
}

fn write_node<W: Write>(factory: &Factory, id: NodeId, w: &mut BinaryWriter<W>) -> Result<()> {
    let node = factory.get_ref(id)?;
    let raw = node.node();
    w.write(id.0)?;
    w.write(node.kind() as u16)?;

    for value in &raw.values {
        match *value {
            Value::Bool(b) => w.write_bool(b)?,
            Value::Int(v) => w.write(v)?,
            Value::Float(v) => w.write(v)?,
            Value::Str(k) => w.write(k.0)?,
        }
    }
    for pos in &raw.positions {
        for v in pos.to_array() {
            w.write(v)?;
        }
    }
    let schema = node.kind().schema();
    for &edge in &schema.singles {
        w.write(node.edge(edge).map_or(0, |t| t.0))?;
    }
    for &edge in &schema.multis {
        for target in node.edges(edge) {
            w.write(target.0)?;
        }
        w.write(0u32)?;
    }
    w.write(0u32)?;
    raw.annotations.write(w)?;
    Ok(())
}

/// Edge read from a record, replayed once every node exists.
struct PendingEdge {
    from: NodeId,
    edge: EdgeKind,
    to: NodeId,
}

/// Deserializes a store. Nothing is returned unless the whole input
/// decodes and every edge passes the schema checks.
pub fn load_from<R: Read>(source: R) -> Result<Factory> {
    let mut r = BinaryReader::new(source);
    r.expect_magic(MAGIC)?;
    let version = r.read::<u32>()?;
    if version != FORMAT_VERSION {
        return Err(AsgError::IncompatibleFile(format!(
            "format version {version}, expected {FORMAT_VERSION}"
        )));
    }

    let strings = StrTable::load(&mut r)?;
    let mut header = Header::empty();
    let count = r.read::<u32>()?;
    for _ in 0..count {
        let key = strings.resolve(Key(r.read::<u32>()?))?;
        let value = strings.resolve(Key(r.read::<u32>()?))?;
        header.set(key, value);
    }
    header.check_compatible()?;

    let capacity = r.read::<u32>()?;
    let mut factory = Factory::from_parts(header, strings);
    let mut pending = Vec::new();
    let mut last = 0u32;
    loop {
        let id = r.read::<u32>()?;
        let tag = r.read::<u16>()?;
        if id == 0 {
            if tag != 0 {
                return Err(CodecError::malformed(format!("end marker carries kind {tag}")).into());
            }
            break;
        }
        if id <= last || id >= capacity {
            return Err(CodecError::malformed(format!(
                "node id {id} after {last} is out of order or not below capacity {capacity}"
            ))
            .into());
        }
        last = id;
        let kind = NodeKind::from_u16(tag).ok_or(AsgError::UnknownNodeKind(tag))?;
        read_node(&mut factory, NodeId(id), kind, &mut r, &mut pending)?;
    }

    for PendingEdge { from, edge, to } in pending {
        if edge.desc().multi {
            factory.add_edge(from, edge, to)?;
        } else {
            factory.set_edge(from, edge, to)?;
        }
    }
    Ok(factory)
}

fn read_node<R: Read>(
    factory: &mut Factory,
    id: NodeId,
    kind: NodeKind,
    r: &mut BinaryReader<R>,
    pending: &mut Vec<PendingEdge>,
) -> Result<()> {
    factory.create_node_with_id(kind, id)?;
    let schema = kind.schema();

    let mut values = Vec::with_capacity(schema.attrs.len());
    for attr in &schema.attrs {
        let value = match attr.scalar_type() {
            ScalarType::Bool => Value::Bool(r.read_bool()?),
            ScalarType::Int => Value::Int(r.read::<i32>()?),
            ScalarType::Float => Value::Float(r.read::<f32>()?),
            ScalarType::Str => {
                let key = Key(r.read::<u32>()?);
                factory.strings().resolve(key)?;
                Value::Str(key)
            }
        };
        values.push(value);
    }

    let mut positions = Vec::with_capacity(schema.positions.len());
    for _ in &schema.positions {
        let mut raw = [0u32; 9];
        for v in raw.iter_mut() {
            *v = r.read::<u32>()?;
        }
        positions.push(SourcePosition::from_array(raw));
    }

    for &edge in &schema.singles {
        let to = r.read::<u32>()?;
        if to != 0 {
            pending.push(PendingEdge { from: id, edge, to: NodeId(to) });
        }
    }
    for &edge in &schema.multis {
        loop {
            let to = r.read::<u32>()?;
            if to == 0 {
                break;
            }
            pending.push(PendingEdge { from: id, edge, to: NodeId(to) });
        }
    }
    let terminator = r.read::<u32>()?;
    if terminator != 0 {
        return Err(CodecError::malformed(format!("node {id}: edge section not terminated")).into());
    }
    let annotations = AttributeList::read(r)?;
    annotations.check_keys(factory.strings())?;

    let node = factory.require_mut(id)?;
    node.values = values;
    node.positions = positions;
    node.annotations = annotations;
    Ok(())
}
