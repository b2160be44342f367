//! In-memory page store.

use crate::error::{Result, StorageError};
use crate::node::Node;
use crate::store::{FreeList, PageStore};
use crate::types::{PageId, PAGE_SIZE};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Counters kept by [`MemoryStore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Successful `alloc` calls
    pub allocations: u64,
    /// Successful `free` calls
    pub frees: u64,
    /// Pages allocated and not yet freed
    pub live_pages: usize,
    /// Largest encoded node size ever passed to `alloc`
    pub max_alloc_size: usize,
}

struct MemoryInner {
    pages: HashMap<PageId, Vec<u8>>,
    free_list: FreeList,
    next_id: u64,
    stats: StoreStats,
}

/// Page store keeping every page in a hash map.
///
/// Freed pages stay readable until [`MemoryStore::reclaim`] drops them.
pub struct MemoryStore {
    page_size: usize,
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    /// Create an empty store for pages of `page_size` bytes
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            inner: Mutex::new(MemoryInner {
                pages: HashMap::new(),
                free_list: FreeList::new(),
                next_id: 1,
                stats: StoreStats::default(),
            }),
        }
    }

    /// Page size this store was created with
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Drop freed pages and make their ids reusable.
    ///
    /// Returns the number of pages reclaimed.
    pub fn reclaim(&self) -> usize {
        let mut inner = self.inner.lock();
        let released = inner.free_list.reclaim();
        for page_id in &released {
            inner.pages.remove(page_id);
        }
        released.len()
    }

    /// Snapshot of the store counters
    pub fn stats(&self) -> StoreStats {
        self.inner.lock().stats
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl PageStore for MemoryStore {
    fn get(&self, page_id: PageId) -> Result<Node> {
        let inner = self.inner.lock();
        let bytes = inner
            .pages
            .get(&page_id)
            .ok_or(StorageError::PageNotFound(page_id))?;
        Node::from_bytes(bytes.clone())
    }

    fn alloc(&self, node: Node) -> Result<PageId> {
        let size = node.encoded_size();
        if size > self.page_size {
            return Err(StorageError::NodeOverflow {
                size,
                page_size: self.page_size,
            });
        }
        if node.capacity() != self.page_size {
            return Err(StorageError::invalid_operation(format!(
                "node buffer is {} bytes, pages are {}",
                node.capacity(),
                self.page_size
            )));
        }

        let mut inner = self.inner.lock();
        let page_id = match inner.free_list.pop() {
            Some(page_id) => page_id,
            None => {
                let page_id = PageId::new(inner.next_id);
                inner.next_id += 1;
                page_id
            }
        };
        inner.pages.insert(page_id, node.into_bytes());

        let stats = &mut inner.stats;
        stats.allocations += 1;
        stats.live_pages += 1;
        stats.max_alloc_size = stats.max_alloc_size.max(size);
        Ok(page_id)
    }

    fn free(&self, page_id: PageId) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.pages.contains_key(&page_id) || inner.free_list.contains(page_id) {
            return Err(StorageError::invalid_operation(format!(
                "page {} is not live",
                page_id
            )));
        }
        inner.free_list.push(page_id);
        inner.stats.frees += 1;
        inner.stats.live_pages -= 1;
        Ok(())
    }
}
