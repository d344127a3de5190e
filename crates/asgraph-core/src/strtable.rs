//! String interner.
//!
//! Every string-valued attribute, node uid and edge type is stored as a
//! [`Key`]. Key `0` is reserved for the empty string so a zeroed field
//! always decodes to "".

use crate::error::{CodecError, Result};
use crate::io::{BinaryReader, BinaryWriter};
use std::collections::HashMap;
use std::fmt;
use std::io::{Read, Write};

/// Magic bytes opening a serialized string table.
pub const STRTABLE_MAGIC: &[u8; 6] = b"STRTBL";

/// Interned string handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Key(pub u32);

impl Key {
    /// The empty string.
    pub const EMPTY: Key = Key(0);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Deduplicating string table. Entries are never removed.
#[derive(Clone)]
pub struct StrTable {
    strings: Vec<String>,
    index: HashMap<String, Key>,
}

impl fmt::Debug for StrTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrTable").field("len", &self.len()).finish()
    }
}

impl Default for StrTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StrTable {
    pub fn new() -> Self {
        let mut index = HashMap::new();
        index.insert(String::new(), Key::EMPTY);
        StrTable {
            strings: vec![String::new()],
            index,
        }
    }

    /// Interns `s`, returning the existing key when already present.
    pub fn set(&mut self, s: &str) -> Key {
        if let Some(&key) = self.index.get(s) {
            return key;
        }
        let key = Key(self.strings.len() as u32);
        self.strings.push(s.to_owned());
        self.index.insert(s.to_owned(), key);
        key
    }

    pub fn get(&self, key: Key) -> Option<&str> {
        self.strings.get(key.0 as usize).map(String::as_str)
    }

    /// Like [`StrTable::get`] but reports unknown keys as an error.
    pub fn resolve(&self, key: Key) -> Result<&str> {
        self.get(key).ok_or(CodecError::UnknownString(key))
    }

    /// Key of `s` if it was interned before. Does not insert.
    pub fn lookup(&self, s: &str) -> Option<Key> {
        self.index.get(s).copied()
    }

    /// Number of interned non-empty strings.
    pub fn len(&self) -> usize {
        self.strings.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-empty entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &str)> {
        self.strings
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, s)| (Key(i as u32), s.as_str()))
    }

    /// Writes `STRTBL`, then `(key, len, bytes)` per entry, then key `0`.
    pub fn save<W: Write>(&self, w: &mut BinaryWriter<W>) -> Result<()> {
        w.write_bytes(STRTABLE_MAGIC)?;
        for (key, s) in self.iter() {
            w.write(key.0)?;
            w.write(s.len() as u32)?;
            w.write_bytes(s.as_bytes())?;
        }
        w.write(0u32)?;
        tracing::debug!("string table saved: {} entries", self.len());
        Ok(())
    }

    /// Reads a table written by [`StrTable::save`], keeping every key.
    pub fn load<R: Read>(r: &mut BinaryReader<R>) -> Result<StrTable> {
        r.expect_magic(STRTABLE_MAGIC)?;
        let mut table = StrTable::new();
        loop {
            let key = r.read::<u32>()?;
            if key == 0 {
                break;
            }
            if key as usize != table.strings.len() {
                return Err(CodecError::malformed(format!(
                    "string key {key} out of sequence, expected {}",
                    table.strings.len()
                )));
            }
            let len = r.read::<u32>()? as usize;
            let bytes = r.read_bytes(len)?;
            let s = String::from_utf8(bytes)
                .map_err(|_| CodecError::malformed(format!("string {key} is not UTF-8")))?;
            if table.index.contains_key(&s) {
                return Err(CodecError::malformed(format!("duplicate string for key {key}")));
            }
            table.index.insert(s.clone(), Key(key));
            table.strings.push(s);
        }
        tracing::debug!("string table loaded: {} entries", table.len());
        Ok(table)
    }
}
