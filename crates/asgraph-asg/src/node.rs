//! Node storage record and its typed values.

use crate::schema::{KindSchema, NodeKind, ScalarType};
use asgraph_core::{AttributeList, Key};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense node identifier. `0` is never a valid id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scalar attribute value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Float(f32),
    /// Interned string.
    Str(Key),
}

impl Value {
    pub fn default_for(ty: ScalarType) -> Value {
        match ty {
            ScalarType::Bool => Value::Bool(false),
            ScalarType::Int => Value::Int(0),
            ScalarType::Float => Value::Float(0.0),
            ScalarType::Str => Value::Str(Key::EMPTY),
        }
    }

    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Value::Bool(_) => ScalarType::Bool,
            Value::Int(_) => ScalarType::Int,
            Value::Float(_) => ScalarType::Float,
            Value::Str(_) => ScalarType::Str,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_key(&self) -> Option<Key> {
        match self {
            Value::Str(k) => Some(*k),
            _ => None,
        }
    }
}

/// Source span: path key, start/end line and column, and the same four
/// coordinates counted in UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePosition {
    pub path: Key,
    pub line: u32,
    pub col: u32,
    pub end_line: u32,
    pub end_col: u32,
    pub wide_line: u32,
    pub wide_col: u32,
    pub wide_end_line: u32,
    pub wide_end_col: u32,
}

impl SourcePosition {
    /// Span whose wide coordinates equal the narrow ones (ASCII source).
    pub fn new(path: Key, line: u32, col: u32, end_line: u32, end_col: u32) -> Self {
        SourcePosition {
            path,
            line,
            col,
            end_line,
            end_col,
            wide_line: line,
            wide_col: col,
            wide_end_line: end_line,
            wide_end_col: end_col,
        }
    }

    pub(crate) fn to_array(self) -> [u32; 9] {
        [
            self.path.0,
            self.line,
            self.col,
            self.end_line,
            self.end_col,
            self.wide_line,
            self.wide_col,
            self.wide_end_line,
            self.wide_end_col,
        ]
    }

    pub(crate) fn from_array(v: [u32; 9]) -> Self {
        SourcePosition {
            path: Key(v[0]),
            line: v[1],
            col: v[2],
            end_line: v[3],
            end_col: v[4],
            wide_line: v[5],
            wide_col: v[6],
            wide_end_line: v[7],
            wide_end_col: v[8],
        }
    }
}

/// One stored node. Slots are laid out by the kind's [`KindSchema`].
///
/// Edge slots hold raw ids; filtering is applied by the accessors on
/// [`crate::Factory`] and [`crate::NodeRef`].
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) values: Vec<Value>,
    pub(crate) positions: Vec<SourcePosition>,
    pub(crate) singles: Vec<Option<NodeId>>,
    pub(crate) multis: Vec<Vec<NodeId>>,
    pub(crate) annotations: AttributeList,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind) -> Self {
        let schema = kind.schema();
        Node {
            id,
            kind,
            parent: None,
            values: schema
                .attrs
                .iter()
                .map(|a| Value::default_for(a.scalar_type()))
                .collect(),
            positions: vec![SourcePosition::default(); schema.positions.len()],
            singles: vec![None; schema.singles.len()],
            multis: vec![Vec::new(); schema.multis.len()],
            annotations: AttributeList::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn schema(&self) -> &'static KindSchema {
        self.kind.schema()
    }

    /// Parent recorded by the last containment edge pointing here.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn annotations(&self) -> &AttributeList {
        &self.annotations
    }
}
