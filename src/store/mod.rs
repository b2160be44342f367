//! Storage layer: the page store contract and its implementations.
//!
//! The tree never touches files or caches directly. It fetches, allocates
//! and frees whole nodes through [`PageStore`], so the same tree code runs
//! over an in-memory map, a single database file, or a cache in front of
//! either.
//!
//! Freed pages are not recycled right away. Every store here parks them on
//! a pending list until `reclaim` is called, so a reader still holding an
//! older root keeps seeing the bytes it expects.

mod cache;
mod file;
mod file_header;
mod freelist;
mod lru;
mod memory;

pub use cache::{CacheStats, CachedStore};
pub use file::FileStore;
pub use file_header::FileHeader;
pub use freelist::FreeList;
pub use memory::{MemoryStore, StoreStats};

use crate::error::Result;
use crate::node::Node;
use crate::types::PageId;
use std::sync::Arc;

/// Page allocation capability the tree depends on.
///
/// Implementations must uphold:
/// - `get` returns exactly the bytes last written for a live id
/// - `alloc` persists the node and returns a fresh id that is never
///   [`PageId::INVALID`] and never one that is still live
/// - `free` releases an id; freeing the same id twice without an
///   intervening `alloc` handing it out again is a caller bug
pub trait PageStore: Send + Sync {
    /// Fetch the node stored under `page_id`
    fn get(&self, page_id: PageId) -> Result<Node>;

    /// Persist a committed node and return its new page id
    fn alloc(&self, node: Node) -> Result<PageId>;

    /// Release a page id
    fn free(&self, page_id: PageId) -> Result<()>;
}

impl<S: PageStore + ?Sized> PageStore for Arc<S> {
    fn get(&self, page_id: PageId) -> Result<Node> {
        (**self).get(page_id)
    }

    fn alloc(&self, node: Node) -> Result<PageId> {
        (**self).alloc(node)
    }

    fn free(&self, page_id: PageId) -> Result<()> {
        (**self).free(page_id)
    }
}
