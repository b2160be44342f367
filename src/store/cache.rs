//! LRU node cache in front of another page store.
//!
//! Allocations write through to the inner store and are cached; frees drop
//! the cached copy before forwarding. Pages are never dirty in the cache,
//! so eviction needs no write-back.

use crate::error::Result;
use crate::node::Node;
use crate::store::lru::LruList;
use crate::store::PageStore;
use crate::types::PageId;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Cache hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from the cache
    pub hits: u64,
    /// Reads forwarded to the inner store
    pub misses: u64,
    /// Nodes currently cached
    pub len: usize,
    /// Maximum number of cached nodes
    pub capacity: usize,
}

struct CacheState {
    nodes: HashMap<PageId, Node>,
    lru: LruList,
    hits: u64,
    misses: u64,
}

/// A [`PageStore`] caching up to `capacity` decoded nodes
pub struct CachedStore<S> {
    inner: S,
    state: Mutex<CacheState>,
    capacity: usize,
}

impl<S: PageStore> CachedStore<S> {
    /// Wrap `inner` with a cache of `capacity` nodes
    pub fn new(inner: S, capacity: usize) -> Self {
        Self {
            inner,
            state: Mutex::new(CacheState {
                nodes: HashMap::with_capacity(capacity),
                lru: LruList::new(capacity),
                hits: 0,
                misses: 0,
            }),
            capacity,
        }
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Current cache counters
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            len: state.nodes.len(),
            capacity: self.capacity,
        }
    }

    fn insert(&self, page_id: PageId, node: Node) {
        if self.capacity == 0 {
            return;
        }
        let mut state = self.state.lock();
        while state.nodes.len() >= self.capacity && !state.nodes.contains_key(&page_id) {
            match state.lru.pop_lru() {
                Some(victim) => {
                    state.nodes.remove(&victim);
                }
                None => break,
            }
        }
        state.lru.touch(page_id);
        state.nodes.insert(page_id, node);
    }
}

impl<S: PageStore> PageStore for CachedStore<S> {
    fn get(&self, page_id: PageId) -> Result<Node> {
        {
            let mut state = self.state.lock();
            if let Some(node) = state.nodes.get(&page_id).cloned() {
                state.hits += 1;
                state.lru.touch(page_id);
                return Ok(node);
            }
            state.misses += 1;
        }

        let node = self.inner.get(page_id)?;
        self.insert(page_id, node.clone());
        Ok(node)
    }

    fn alloc(&self, node: Node) -> Result<PageId> {
        let page_id = self.inner.alloc(node.clone())?;
        self.insert(page_id, node);
        Ok(page_id)
    }

    fn free(&self, page_id: PageId) -> Result<()> {
        {
            let mut state = self.state.lock();
            state.nodes.remove(&page_id);
            state.lru.remove(page_id);
        }
        self.inner.free(page_id)
    }
}
