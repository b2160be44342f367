//! Node header and little-endian field helpers.
//!
//! Every multi-byte field of a node is read and written through the helpers
//! below; the buffer is never reinterpreted through a wider integer type.

use crate::types::{NodeType, HEADER_SIZE};

/// Node header structure
///
/// Layout (4 bytes, little-endian):
/// ```text
/// Offset  Size  Description
/// 0       2     Node type (1 = internal, 2 = leaf)
/// 2       2     Number of entries
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHeader {
    /// Leaf or internal
    pub node_type: NodeType,
    /// Number of entries in the node
    pub key_count: u16,
}

impl NodeHeader {
    /// Create a header for a node with `key_count` entries
    pub fn new(node_type: NodeType, key_count: u16) -> Self {
        Self {
            node_type,
            key_count,
        }
    }

    /// Read the raw `(type tag, key count)` pair without validating the tag
    pub fn read_raw(bytes: &[u8]) -> (u16, u16) {
        (read_u16(bytes, 0), read_u16(bytes, 2))
    }

    /// Read a header, returning `None` if the type tag is unknown
    pub fn read(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_SIZE {
            return None;
        }
        let (tag, key_count) = Self::read_raw(bytes);
        let node_type = NodeType::from_tag(tag)?;
        Some(Self {
            node_type,
            key_count,
        })
    }

    /// Write this header to bytes
    pub fn write(&self, bytes: &mut [u8]) {
        write_u16(bytes, 0, self.node_type as u16);
        write_u16(bytes, 2, self.key_count);
    }
}

pub(crate) fn read_u16(bytes: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([bytes[pos], bytes[pos + 1]])
}

pub(crate) fn write_u16(bytes: &mut [u8], pos: usize, value: u16) {
    bytes[pos..pos + 2].copy_from_slice(&value.to_le_bytes());
}

pub(crate) fn read_u64(bytes: &[u8], pos: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[pos..pos + 8]);
    u64::from_le_bytes(buf)
}

pub(crate) fn write_u64(bytes: &mut [u8], pos: usize, value: u64) {
    bytes[pos..pos + 8].copy_from_slice(&value.to_le_bytes());
}
