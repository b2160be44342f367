//! Common types and layout constants used throughout the storage engine.

mod page_id;

pub use page_id::PageId;

use crate::error::{Result, StorageError};
use serde::{Deserialize, Serialize};

/// Page size in bytes (4KB)
pub const PAGE_SIZE: usize = 4096;

/// Node header: 2-byte type tag followed by a 2-byte key count
pub const HEADER_SIZE: usize = 4;

/// Width of one child pointer slot
pub const POINTER_SIZE: usize = 8;

/// Width of one offset table slot
pub const OFFSET_SIZE: usize = 2;

/// Length prefix of an entry: 2-byte key length, 2-byte value length
pub const KV_HEADER_SIZE: usize = 4;

/// Maximum key size
pub const MAX_KEY_SIZE: usize = 1000;

/// Maximum value size
pub const MAX_VALUE_SIZE: usize = 3000;

/// Largest page size a tree accepts.
///
/// A node under construction may span two pages, and its payload offsets
/// are stored as `u16`.
pub const MAX_PAGE_SIZE: usize = 1 << 15;

/// Encoded size of a node holding exactly one maximal entry
pub const NODE1_MAX: usize = node1max(MAX_KEY_SIZE, MAX_VALUE_SIZE);

const _: () = assert!(
    NODE1_MAX <= PAGE_SIZE,
    "a node with one maximal entry must fit in a page"
);

/// Encoded size of a node holding a single entry of the given bounds
pub const fn node1max(max_key_size: usize, max_value_size: usize) -> usize {
    HEADER_SIZE + POINTER_SIZE + OFFSET_SIZE + KV_HEADER_SIZE + max_key_size + max_value_size
}

/// Node kinds, stored as the first two bytes of every page
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Internal node: keys and child page ids
    Internal = 1,
    /// Leaf node: keys and values
    Leaf = 2,
}

impl NodeType {
    /// Check if this is a leaf node type
    pub fn is_leaf(self) -> bool {
        self == Self::Leaf
    }

    /// Check if this is an internal node type
    pub fn is_internal(self) -> bool {
        self == Self::Internal
    }

    /// Convert from the on-page tag
    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            1 => Some(Self::Internal),
            2 => Some(Self::Leaf),
            _ => None,
        }
    }
}

/// Page geometry of a tree.
///
/// The defaults are the compile-time constants above. Smaller pages are
/// allowed as long as [`TreeConfig::validate`] passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeConfig {
    /// Page size in bytes
    pub page_size: usize,
    /// Maximum key size accepted by insert
    pub max_key_size: usize,
    /// Maximum value size accepted by insert
    pub max_value_size: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            max_key_size: MAX_KEY_SIZE,
            max_value_size: MAX_VALUE_SIZE,
        }
    }
}

impl TreeConfig {
    /// Create a new config with custom limits
    pub fn new(page_size: usize, max_key_size: usize, max_value_size: usize) -> Self {
        Self {
            page_size,
            max_key_size,
            max_value_size,
        }
    }

    /// Encoded size of a node holding one maximal entry under this config
    pub fn node1max(&self) -> usize {
        node1max(self.max_key_size, self.max_value_size)
    }

    /// Check the startup invariants.
    ///
    /// A node holding a single maximal entry must fit a page, otherwise no
    /// split could ever produce committable nodes.
    pub fn validate(&self) -> Result<()> {
        if self.page_size > MAX_PAGE_SIZE {
            return Err(StorageError::invalid_config(format!(
                "page size {} exceeds {}",
                self.page_size, MAX_PAGE_SIZE
            )));
        }
        if self.max_key_size == 0 {
            return Err(StorageError::invalid_config("max key size must be positive"));
        }
        if self.node1max() > self.page_size {
            return Err(StorageError::invalid_config(format!(
                "a single entry needs up to {} bytes but pages hold {}",
                self.node1max(),
                self.page_size
            )));
        }
        // a promoted root holds up to three separator keys
        let root3max =
            HEADER_SIZE + 3 * (POINTER_SIZE + OFFSET_SIZE + KV_HEADER_SIZE + self.max_key_size);
        if root3max > self.page_size {
            return Err(StorageError::invalid_config(format!(
                "three separator keys need up to {} bytes but pages hold {}",
                root3max, self.page_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_conversions() {
        assert!(NodeType::Leaf.is_leaf());
        assert!(!NodeType::Internal.is_leaf());
        assert!(NodeType::Internal.is_internal());

        assert_eq!(NodeType::from_tag(1), Some(NodeType::Internal));
        assert_eq!(NodeType::from_tag(2), Some(NodeType::Leaf));
        assert_eq!(NodeType::from_tag(0), None);
        assert_eq!(NodeType::from_tag(0xFF), None);
    }

    #[test]
    fn test_single_entry_bound() {
        // 4 + 8 + 2 + 4 + 1000 + 3000
        assert_eq!(NODE1_MAX, 4014);
        assert!(NODE1_MAX <= PAGE_SIZE);
        assert!(TreeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_entries() {
        let config = TreeConfig::new(1024, 100, 1000);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, StorageError::InvalidConfig(_)));
        assert!(err.is_fatal());

        assert!(TreeConfig::new(1024, 100, 800).validate().is_ok());
        assert!(TreeConfig::new(1 << 16, 100, 100).validate().is_err());
        assert!(TreeConfig::new(1024, 0, 100).validate().is_err());
        // one entry fits, but a root with three long separators would not
        assert!(TreeConfig::new(1100, 1000, 50).validate().is_err());
    }

    #[test]
    fn test_config_json_field_names() {
        let json = serde_json::to_string(&TreeConfig::default()).unwrap();
        assert!(json.contains("\"pageSize\":4096"));
        let back: TreeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TreeConfig::default());
    }
}
