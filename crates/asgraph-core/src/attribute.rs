//! Typed attributes attached to graph nodes and edges.
//!
//! An attribute is a `(name, context)` tagged value. Composite attributes
//! nest further attributes and are looked up the same way as top-level
//! ones.

use crate::error::{CodecError, Result};
use crate::io::{BinaryReader, BinaryWriter};
use crate::strtable::{Key, StrTable};
use std::io::{Read, Write};

/// Deepest composite nesting accepted when decoding.
const MAX_NESTING: usize = 64;

/// Attribute type tag, as written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Int = 0,
    Float = 1,
    String = 2,
    Composite = 3,
}

impl AttributeType {
    pub fn from_u32(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(AttributeType::Int),
            1 => Some(AttributeType::Float),
            2 => Some(AttributeType::String),
            3 => Some(AttributeType::Composite),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttributeType::Int => "int",
            AttributeType::Float => "float",
            AttributeType::String => "string",
            AttributeType::Composite => "composite",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Int(i32),
    Float(f32),
    /// Interned string.
    String(Key),
    Composite(AttributeList),
}

/// A single tagged attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: Key,
    pub context: Key,
    pub value: AttributeValue,
}

impl Attribute {
    pub fn int(name: Key, context: Key, value: i32) -> Self {
        Attribute { name, context, value: AttributeValue::Int(value) }
    }

    pub fn float(name: Key, context: Key, value: f32) -> Self {
        Attribute { name, context, value: AttributeValue::Float(value) }
    }

    pub fn string(name: Key, context: Key, value: Key) -> Self {
        Attribute { name, context, value: AttributeValue::String(value) }
    }

    /// An empty composite.
    pub fn composite(name: Key, context: Key) -> Self {
        Attribute {
            name,
            context,
            value: AttributeValue::Composite(AttributeList::default()),
        }
    }

    pub fn kind(&self) -> AttributeType {
        match self.value {
            AttributeValue::Int(_) => AttributeType::Int,
            AttributeValue::Float(_) => AttributeType::Float,
            AttributeValue::String(_) => AttributeType::String,
            AttributeValue::Composite(_) => AttributeType::Composite,
        }
    }

    /// True when type, name and context all match.
    pub fn matches(&self, kind: AttributeType, name: Key, context: Key) -> bool {
        self.kind() == kind && self.name == name && self.context == context
    }

    /// Children of a composite; `None` for scalar attributes.
    pub fn children(&self) -> Option<&AttributeList> {
        match &self.value {
            AttributeValue::Composite(list) => Some(list),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut AttributeList> {
        match &mut self.value {
            AttributeValue::Composite(list) => Some(list),
            _ => None,
        }
    }

    /// Human-readable form, e.g. `loc[metric]=12` or `extra{...}`.
    pub fn render(&self, strings: &StrTable) -> String {
        let name = strings.get(self.name).unwrap_or("?");
        let head = match strings.get(self.context) {
            Some("") | None => name.to_owned(),
            Some(ctx) => format!("{name}[{ctx}]"),
        };
        match &self.value {
            AttributeValue::Int(v) => format!("{head}={v}"),
            AttributeValue::Float(v) => format!("{head}={v}"),
            AttributeValue::String(k) => {
                format!("{head}={:?}", strings.get(*k).unwrap_or("?"))
            }
            AttributeValue::Composite(list) => {
                let inner: Vec<String> = list.iter().map(|a| a.render(strings)).collect();
                format!("{head}{{{}}}", inner.join(", "))
            }
        }
    }

    /// Type tag, name key, context key, then the value. Composites write
    /// their child count followed by each child.
    pub fn write<W: Write>(&self, w: &mut BinaryWriter<W>) -> Result<()> {
        w.write(self.kind() as u32)?;
        w.write(self.name.0)?;
        w.write(self.context.0)?;
        match &self.value {
            AttributeValue::Int(v) => w.write(*v),
            AttributeValue::Float(v) => w.write(*v),
            AttributeValue::String(k) => w.write(k.0),
            AttributeValue::Composite(list) => list.write(w),
        }
    }

    pub fn read<R: Read>(r: &mut BinaryReader<R>) -> Result<Attribute> {
        Self::read_nested(r, 0)
    }

    /// Fails with [`CodecError::UnknownString`] if any key, including
    /// those of nested children, is missing from `strings`.
    pub fn check_keys(&self, strings: &StrTable) -> Result<()> {
        strings.resolve(self.name)?;
        strings.resolve(self.context)?;
        match &self.value {
            AttributeValue::String(k) => strings.resolve(*k).map(|_| ()),
            AttributeValue::Composite(list) => list.check_keys(strings),
            AttributeValue::Int(_) | AttributeValue::Float(_) => Ok(()),
        }
    }

    /// Copy of this attribute with every key re-interned from `from`
    /// into `to`.
    pub fn translate(&self, from: &StrTable, to: &mut StrTable) -> Result<Attribute> {
        let name = to.set(from.resolve(self.name)?);
        let context = to.set(from.resolve(self.context)?);
        let value = match &self.value {
            AttributeValue::Int(v) => AttributeValue::Int(*v),
            AttributeValue::Float(v) => AttributeValue::Float(*v),
            AttributeValue::String(k) => AttributeValue::String(to.set(from.resolve(*k)?)),
            AttributeValue::Composite(list) => AttributeValue::Composite(list.translate(from, to)?),
        };
        Ok(Attribute { name, context, value })
    }

    fn read_nested<R: Read>(r: &mut BinaryReader<R>, depth: usize) -> Result<Attribute> {
        let tag = r.read::<u32>()?;
        let kind = AttributeType::from_u32(tag)
            .ok_or_else(|| CodecError::malformed(format!("unknown attribute type {tag}")))?;
        let name = Key(r.read::<u32>()?);
        let context = Key(r.read::<u32>()?);
        let value = match kind {
            AttributeType::Int => AttributeValue::Int(r.read::<i32>()?),
            AttributeType::Float => AttributeValue::Float(r.read::<f32>()?),
            AttributeType::String => AttributeValue::String(Key(r.read::<u32>()?)),
            AttributeType::Composite => {
                if depth >= MAX_NESTING {
                    return Err(CodecError::malformed("composite attributes nested too deeply"));
                }
                AttributeValue::Composite(AttributeList::read_nested(r, depth + 1)?)
            }
        };
        Ok(Attribute { name, context, value })
    }
}

/// Ordered list of attributes; duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeList(Vec<Attribute>);

impl AttributeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, attr: Attribute) {
        self.0.push(attr);
    }

    pub fn find(&self, kind: AttributeType, name: Key, context: Key) -> Option<&Attribute> {
        self.0.iter().find(|a| a.matches(kind, name, context))
    }

    pub fn find_mut(&mut self, kind: AttributeType, name: Key, context: Key) -> Option<&mut Attribute> {
        self.0.iter_mut().find(|a| a.matches(kind, name, context))
    }

    /// Removes the first matching attribute.
    pub fn remove(&mut self, kind: AttributeType, name: Key, context: Key) -> Option<Attribute> {
        let pos = self.0.iter().position(|a| a.matches(kind, name, context))?;
        Some(self.0.remove(pos))
    }

    pub fn by_name(&self, name: Key) -> impl Iterator<Item = &Attribute> {
        self.0.iter().filter(move |a| a.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Count, then each attribute.
    pub fn write<W: Write>(&self, w: &mut BinaryWriter<W>) -> Result<()> {
        w.write(self.0.len() as u32)?;
        for attr in &self.0 {
            attr.write(w)?;
        }
        Ok(())
    }

    pub fn read<R: Read>(r: &mut BinaryReader<R>) -> Result<AttributeList> {
        Self::read_nested(r, 0)
    }

    pub fn check_keys(&self, strings: &StrTable) -> Result<()> {
        self.0.iter().try_for_each(|a| a.check_keys(strings))
    }

    pub fn translate(&self, from: &StrTable, to: &mut StrTable) -> Result<AttributeList> {
        self.0.iter().map(|a| a.translate(from, to)).collect()
    }

    /// Removes every attribute matching type, name and context; returns
    /// how many went.
    pub fn remove_all(&mut self, kind: AttributeType, name: Key, context: Key) -> usize {
        let before = self.0.len();
        self.0.retain(|a| !a.matches(kind, name, context));
        before - self.0.len()
    }

    fn read_nested<R: Read>(r: &mut BinaryReader<R>, depth: usize) -> Result<AttributeList> {
        let count = r.read::<u32>()?;
        let mut list = AttributeList::new();
        for _ in 0..count {
            list.add(Attribute::read_nested(r, depth)?);
        }
        Ok(list)
    }
}

impl<'a> IntoIterator for &'a AttributeList {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Attribute> for AttributeList {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        AttributeList(iter.into_iter().collect())
    }
}
