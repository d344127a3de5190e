//! Tombstone bits for logically removed nodes.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// Per-id filter state. Disabling the filter hides the bits without
/// losing them.
#[derive(Debug, Clone)]
pub struct Filter {
    bits: Vec<bool>,
    enabled: bool,
}

impl Default for Filter {
    fn default() -> Self {
        Filter {
            bits: Vec::new(),
            enabled: true,
        }
    }
}

/// On-disk form: store capacity plus the filtered ids.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct FilterFile {
    pub capacity: u32,
    pub filtered: Vec<NodeId>,
}

impl Filter {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Filter state as seen by accessors: always false while disabled.
    pub fn is_filtered(&self, id: NodeId) -> bool {
        self.enabled && self.is_marked(id)
    }

    /// Stored bit, regardless of whether the filter is enabled.
    pub fn is_marked(&self, id: NodeId) -> bool {
        self.bits.get(id.index()).copied().unwrap_or(false)
    }

    pub(crate) fn mark(&mut self, id: NodeId, filtered: bool) {
        let idx = id.index();
        if idx >= self.bits.len() {
            if !filtered {
                return;
            }
            self.bits.resize(idx + 1, false);
        }
        self.bits[idx] = filtered;
    }

    /// Number of marked ids.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    pub fn marked(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(|(i, _)| NodeId(i as u32))
    }

    pub(crate) fn clear(&mut self) {
        self.bits.clear();
    }

    pub(crate) fn to_file(&self, capacity: usize) -> FilterFile {
        FilterFile {
            capacity: capacity as u32,
            filtered: self.marked().collect(),
        }
    }
}
