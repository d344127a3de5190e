//! File header property data.

use crate::error::{AsgError, Result};
use std::collections::BTreeMap;

pub const TYPE_KEY: &str = "Type";
pub const API_VERSION_KEY: &str = "APIVersion";
pub const BINARY_VERSION_KEY: &str = "BinaryVersion";
pub const LANGUAGE_KEY: &str = "Language";

pub const GRAPH_TYPE: &str = "AbstractSemanticGraph";
pub const API_VERSION: &str = "1.0";
pub const BINARY_VERSION: &str = "1.0";

/// Key/value properties saved in front of the node records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    props: BTreeMap<String, String>,
}

impl Default for Header {
    fn default() -> Self {
        let mut header = Header::empty();
        header.set(TYPE_KEY, GRAPH_TYPE);
        header.set(API_VERSION_KEY, API_VERSION);
        header.set(BINARY_VERSION_KEY, BINARY_VERSION);
        header
    }
}

impl Header {
    /// Header without any properties.
    pub fn empty() -> Self {
        Header { props: BTreeMap::new() }
    }

    /// Default header tagged with a source language.
    pub fn for_language(language: &str) -> Self {
        let mut header = Header::default();
        header.set(LANGUAGE_KEY, language);
        header
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.props.insert(key.to_owned(), value.to_owned());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }

    pub fn language(&self) -> Option<&str> {
        self.get(LANGUAGE_KEY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Rejects headers written for another graph type or format version.
    pub fn check_compatible(&self) -> Result<()> {
        for (key, expected) in [
            (TYPE_KEY, GRAPH_TYPE),
            (API_VERSION_KEY, API_VERSION),
            (BINARY_VERSION_KEY, BINARY_VERSION),
        ] {
            match self.get(key) {
                Some(found) if found == expected => {}
                Some(found) => {
                    return Err(AsgError::IncompatibleFile(format!(
                        "{key} is {found:?}, expected {expected:?}"
                    )));
                }
                None => {
                    return Err(AsgError::IncompatibleFile(format!("missing {key}")));
                }
            }
        }
        Ok(())
    }
}
