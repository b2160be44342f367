//! Overflow splitting.
//!
//! A node built by an insert may encode to more than a page. It is cut into
//! two siblings at the middle entry; when the middle cut leaves a side too
//! big, the nearest cut that fits both sides is used instead, and when no
//! two-way cut fits, the node becomes three siblings. Since a single entry
//! always fits a page and an over-full node holds at most one page plus the
//! new entries, three siblings are always enough.

use crate::error::{Result, StorageError};
use crate::node::Node;

/// Split `node` into 1 to 3 siblings, each committed to `page_size`.
///
/// Entries keep their order and pointers travel with their entries: slot
/// `i` of the input ends up in exactly one sibling.
pub(crate) fn split(node: Node, page_size: usize) -> Result<Vec<Node>> {
    if node.fits(page_size) {
        return Ok(vec![node.commit(page_size)?]);
    }

    let count = node.key_count();
    if let Some(mid) = two_way_cut(&node, 0, count, page_size) {
        tracing::debug!(
            entries = count,
            size = node.encoded_size(),
            left = mid,
            "split node in two"
        );
        return Ok(vec![
            slice(&node, 0, mid, page_size),
            slice(&node, mid, count, page_size),
        ]);
    }

    // Give the right sibling as many trailing entries as fit, then cut the
    // remainder in two.
    let mut right = count - 1;
    while right > 1 && node.range_size(right - 1, count) <= page_size {
        right -= 1;
    }
    let left = two_way_cut(&node, 0, right, page_size).ok_or(StorageError::NodeOverflow {
        size: node.range_size(0, right),
        page_size,
    })?;

    tracing::debug!(
        entries = count,
        size = node.encoded_size(),
        cuts = ?(left, right),
        "split node in three"
    );
    Ok(vec![
        slice(&node, 0, left, page_size),
        slice(&node, left, right, page_size),
        slice(&node, right, count, page_size),
    ])
}

/// Cut point in `(from, to)` closest to the middle such that both
/// `[from, cut)` and `[cut, to)` fit a page.
fn two_way_cut(node: &Node, from: usize, to: usize, page_size: usize) -> Option<usize> {
    let mid = from + (to - from) / 2;
    (from + 1..to)
        .filter(|&cut| {
            node.range_size(from, cut) <= page_size && node.range_size(cut, to) <= page_size
        })
        .min_by_key(|&cut| (cut.abs_diff(mid), cut))
}

/// New page-sized node holding entries `[from, to)` of `node`
fn slice(node: &Node, from: usize, to: usize, page_size: usize) -> Node {
    let mut part = Node::new(node.node_type(), (to - from) as u16, page_size);
    part.append_range(0, node, from, to - from);
    part
}
