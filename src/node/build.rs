//! Building new node versions.
//!
//! Nodes are never edited in place. A new version is built front to back:
//! entries must be appended in increasing index order, because each append
//! reads the offset left behind by the previous one.

use crate::node::header::write_u16;
use crate::node::Node;
use crate::types::{NodeType, PageId, KV_HEADER_SIZE};

impl Node {
    /// Copy `n` entries of `src` starting at `src_start` into slots
    /// `dst_start..dst_start + n` of this node.
    ///
    /// Pointers are copied as-is; offsets are rebased onto this node's
    /// running offset; entry bytes are copied verbatim.
    ///
    /// # Panics
    ///
    /// Panics if either range runs past its node's key count.
    pub fn append_range(&mut self, dst_start: usize, src: &Node, src_start: usize, n: usize) {
        assert!(src_start + n <= src.key_count(), "source range out of bounds");
        assert!(dst_start + n <= self.key_count(), "destination range out of bounds");
        if n == 0 {
            return;
        }

        for i in 0..n {
            self.set_pointer(dst_start + i, src.pointer(src_start + i));
        }

        let dst_begin = self.offset(dst_start);
        let src_begin = src.offset(src_start);
        for i in 1..=n {
            let offset = dst_begin + (src.offset(src_start + i) - src_begin);
            self.set_offset(dst_start + i, offset);
        }

        let begin = src.entry_start(src_start);
        let end = src.entry_start(src_start + n);
        let at = self.entry_start(dst_start);
        self.data_mut()[at..at + (end - begin)].copy_from_slice(&src.as_bytes()[begin..end]);
    }

    /// Write entry `idx`: its pointer slot, its length-prefixed key and
    /// value, and the offset where the next entry starts.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= key_count()`.
    pub fn append_entry(&mut self, idx: usize, pointer: PageId, key: &[u8], value: &[u8]) {
        self.set_pointer(idx, pointer);

        let pos = self.entry_start(idx);
        let data = self.data_mut();
        write_u16(data, pos, key.len() as u16);
        write_u16(data, pos + 2, value.len() as u16);
        let key_at = pos + KV_HEADER_SIZE;
        data[key_at..key_at + key.len()].copy_from_slice(key);
        let value_at = key_at + key.len();
        data[value_at..value_at + value.len()].copy_from_slice(value);

        let next = self.offset(idx) + (KV_HEADER_SIZE + key.len() + value.len()) as u16;
        self.set_offset(idx + 1, next);
    }

    /// New leaf with `(key, value)` inserted at `idx` and the old entries
    /// from `idx` on shifted right by one.
    ///
    /// The result may exceed a page; splitting is the caller's job.
    pub fn leaf_insert(old: &Node, idx: usize, key: &[u8], value: &[u8]) -> Node {
        let count = old.key_count();
        let mut node = Node::new(NodeType::Leaf, (count + 1) as u16, 2 * old.capacity());
        node.append_range(0, old, 0, idx);
        node.append_entry(idx, PageId::INVALID, key, value);
        node.append_range(idx + 1, old, idx, count - idx);
        node
    }

    /// New leaf with the value of entry `idx` replaced.
    pub fn leaf_update(old: &Node, idx: usize, key: &[u8], value: &[u8]) -> Node {
        let count = old.key_count();
        let mut node = Node::new(NodeType::Leaf, count as u16, 2 * old.capacity());
        node.append_range(0, old, 0, idx);
        node.append_entry(idx, PageId::INVALID, key, value);
        node.append_range(idx + 1, old, idx + 1, count - idx - 1);
        node
    }

    /// New internal node with entry `idx` replaced by one entry per
    /// `(page id, first key)` in `children`.
    ///
    /// # Panics
    ///
    /// Panics if `children` is empty or `idx >= key_count()`.
    pub fn replace_children(old: &Node, idx: usize, children: &[(PageId, &[u8])]) -> Node {
        assert!(!children.is_empty(), "no replacement children");
        let count = old.key_count();
        assert!(idx < count, "child index {} out of range", idx);

        let inc = children.len();
        let mut node = Node::new(
            NodeType::Internal,
            (count + inc - 1) as u16,
            2 * old.capacity(),
        );
        node.append_range(0, old, 0, idx);
        for (i, (page_id, key)) in children.iter().enumerate() {
            node.append_entry(idx + i, *page_id, key, b"");
        }
        node.append_range(idx + inc, old, idx + 1, count - idx - 1);
        node
    }
}
