//! The copy-on-write B+ tree.
//!
//! [`BTree`] supports point lookups, inserts and updates, range scans and
//! a structural self-check. Nodes that outgrow a page are split by the
//! `split` module into up to three page-sized siblings.

mod split;
mod tree;

pub use tree::{BTree, TreeStats};
