//! Fixed-layout node buffer.
//!
//! ```text
//! ┌────────┬──────────────────┬─────────────────┬──────────────────────────┐
//! │ header │ pointers (8 × N) │ offsets (2 × N) │ entries                  │
//! │ 4B     │ child page ids   │ end of entry i  │ klen vlen key value ...  │
//! └────────┴──────────────────┴─────────────────┴──────────────────────────┘
//! ```
//!
//! Offset slot `i - 1` stores where entry `i - 1` ends (and entry `i`
//! starts) relative to the start of the entry area. The start of entry 0 is
//! implicitly 0 and has no slot. Leaves keep the pointer table too; its
//! slots are simply left at zero.

use crate::error::{Result, StorageError};
use crate::node::header::{read_u16, read_u64, write_u16, write_u64, NodeHeader};
use crate::types::{NodeType, PageId, HEADER_SIZE, KV_HEADER_SIZE, OFFSET_SIZE, POINTER_SIZE};
use std::fmt;

/// A single tree node backed by a byte buffer.
///
/// Nodes read from a page store are exactly one page long. Nodes under
/// construction are allocated with spare room (see [`Node::scratch`]) and
/// may temporarily encode to more than a page until they are split.
#[derive(Clone, PartialEq, Eq)]
pub struct Node {
    /// The raw node data
    data: Vec<u8>,
    /// Cached header (kept in sync with data)
    header: NodeHeader,
}

impl Node {
    /// Create a zeroed node of `capacity` bytes with the given header.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` cannot hold the header plus the pointer and
    /// offset tables for `key_count` entries.
    pub fn new(node_type: NodeType, key_count: u16, capacity: usize) -> Self {
        assert!(
            table_end(key_count as usize) <= capacity,
            "capacity {} too small for {} entries",
            capacity,
            key_count
        );
        let mut data = vec![0u8; capacity];
        let header = NodeHeader::new(node_type, key_count);
        header.write(&mut data);
        Self { data, header }
    }

    /// Create a node under construction that may grow past one page.
    pub fn scratch(node_type: NodeType, key_count: u16, page_size: usize) -> Self {
        Self::new(node_type, key_count, 2 * page_size)
    }

    /// Load a node from the bytes of a page.
    ///
    /// Rejects unknown type tags and tables or entries that run past the
    /// end of the buffer.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(StorageError::corruption("page shorter than node header"));
        }
        let (tag, _) = NodeHeader::read_raw(&data);
        let header = NodeHeader::read(&data).ok_or(StorageError::InvalidNodeType(tag))?;
        let count = header.key_count as usize;

        if count == 0 {
            return Err(StorageError::corruption("node has no entries"));
        }
        if table_end(count) > data.len() {
            return Err(StorageError::corruption(format!(
                "{} entries do not fit a {} byte page",
                count,
                data.len()
            )));
        }

        let node = Self { data, header };
        if node.encoded_size() > node.data.len() {
            return Err(StorageError::corruption(format!(
                "entries end at {} past the {} byte page",
                node.encoded_size(),
                node.data.len()
            )));
        }
        Ok(node)
    }

    /// Get the raw bytes of this node
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the node and return its buffer
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Size of the backing buffer
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Get the node header
    pub fn header(&self) -> NodeHeader {
        self.header
    }

    /// Overwrite the node header
    pub fn set_header(&mut self, node_type: NodeType, key_count: u16) {
        self.header = NodeHeader::new(node_type, key_count);
        self.header.write(&mut self.data);
    }

    /// Leaf or internal
    pub fn node_type(&self) -> NodeType {
        self.header.node_type
    }

    /// Check if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        self.header.node_type.is_leaf()
    }

    /// Number of entries
    pub fn key_count(&self) -> usize {
        self.header.key_count as usize
    }

    /// Child page id stored in slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= key_count()`.
    pub fn pointer(&self, idx: usize) -> PageId {
        assert!(idx < self.key_count(), "pointer index {} out of range", idx);
        PageId::new(read_u64(&self.data, HEADER_SIZE + POINTER_SIZE * idx))
    }

    /// Store a child page id in slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= key_count()`.
    pub fn set_pointer(&mut self, idx: usize, page_id: PageId) {
        assert!(idx < self.key_count(), "pointer index {} out of range", idx);
        write_u64(&mut self.data, HEADER_SIZE + POINTER_SIZE * idx, page_id.value());
    }

    fn offset_pos(&self, idx: usize) -> usize {
        assert!(
            (1..=self.key_count()).contains(&idx),
            "offset index {} out of range",
            idx
        );
        HEADER_SIZE + POINTER_SIZE * self.key_count() + OFFSET_SIZE * (idx - 1)
    }

    /// Start of entry `idx` relative to the entry area; 0 for `idx == 0`.
    pub fn offset(&self, idx: usize) -> u16 {
        if idx == 0 {
            return 0;
        }
        read_u16(&self.data, self.offset_pos(idx))
    }

    /// Record where entry `idx - 1` ends.
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= idx <= key_count()`.
    pub fn set_offset(&mut self, idx: usize, offset: u16) {
        let pos = self.offset_pos(idx);
        write_u16(&mut self.data, pos, offset);
    }

    /// Absolute position of entry `idx`; `entry_start(key_count())` is the
    /// end of the last entry.
    ///
    /// # Panics
    ///
    /// Panics if `idx > key_count()`.
    pub fn entry_start(&self, idx: usize) -> usize {
        assert!(idx <= self.key_count(), "entry index {} out of range", idx);
        table_end(self.key_count()) + self.offset(idx) as usize
    }

    /// Key of entry `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= key_count()`.
    pub fn key(&self, idx: usize) -> &[u8] {
        assert!(idx < self.key_count(), "key index {} out of range", idx);
        let pos = self.entry_start(idx);
        let key_len = read_u16(&self.data, pos) as usize;
        let start = pos + KV_HEADER_SIZE;
        &self.data[start..start + key_len]
    }

    /// Value of entry `idx`; always empty on internal nodes.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= key_count()`.
    pub fn value(&self, idx: usize) -> &[u8] {
        assert!(idx < self.key_count(), "value index {} out of range", idx);
        let pos = self.entry_start(idx);
        let key_len = read_u16(&self.data, pos) as usize;
        let value_len = read_u16(&self.data, pos + 2) as usize;
        let start = pos + KV_HEADER_SIZE + key_len;
        &self.data[start..start + value_len]
    }

    /// Total size of the node as currently populated
    pub fn encoded_size(&self) -> usize {
        self.entry_start(self.key_count())
    }

    /// Encoded size of a node made of entries `[from, to)` of this one
    pub fn range_size(&self, from: usize, to: usize) -> usize {
        debug_assert!(from <= to);
        table_end(to - from) + (self.offset(to) - self.offset(from)) as usize
    }

    /// Whether the node fits a page of `page_size` bytes
    pub fn fits(&self, page_size: usize) -> bool {
        self.encoded_size() <= page_size
    }

    /// Shrink a finished node to exactly one page.
    ///
    /// Fails with [`StorageError::NodeOverflow`] if the entries do not fit.
    pub fn commit(mut self, page_size: usize) -> Result<Self> {
        let size = self.encoded_size();
        if size > page_size {
            return Err(StorageError::NodeOverflow { size, page_size });
        }
        self.data.resize(page_size, 0);
        Ok(self)
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// End of the pointer and offset tables for a node with `count` entries
fn table_end(count: usize) -> usize {
    HEADER_SIZE + (POINTER_SIZE + OFFSET_SIZE) * count
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for i in 0..self.key_count() {
            if self.is_leaf() {
                list.entry(&(String::from_utf8_lossy(self.key(i)), self.value(i).len()));
            } else {
                list.entry(&(String::from_utf8_lossy(self.key(i)), self.pointer(i).value()));
            }
        }
        list.finish()
    }
}
