//! Recency ordering for cached pages.

use crate::types::PageId;
use std::collections::HashMap;

const NIL: usize = usize::MAX;

#[derive(Clone, Copy)]
struct Slot {
    page_id: PageId,
    prev: usize,
    next: usize,
}

/// Tracks page access order with O(1) touch, remove and eviction.
///
/// Slots form a doubly linked list threaded through a vector; the head is
/// the most recently used page and the tail the least.
pub struct LruList {
    index: HashMap<PageId, usize>,
    slots: Vec<Slot>,
    vacant: Vec<usize>,
    head: usize,
    tail: usize,
}

impl LruList {
    /// Create an empty list sized for `capacity` pages
    pub fn new(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            vacant: Vec::new(),
            head: NIL,
            tail: NIL,
        }
    }

    /// Mark a page as most recently used, adding it if absent
    pub fn touch(&mut self, page_id: PageId) {
        match self.index.get(&page_id) {
            Some(&pos) => {
                self.unlink(pos);
                self.push_front(pos);
            }
            None => {
                let slot = Slot {
                    page_id,
                    prev: NIL,
                    next: NIL,
                };
                let pos = match self.vacant.pop() {
                    Some(pos) => {
                        self.slots[pos] = slot;
                        pos
                    }
                    None => {
                        self.slots.push(slot);
                        self.slots.len() - 1
                    }
                };
                self.push_front(pos);
                self.index.insert(page_id, pos);
            }
        }
    }

    /// Forget a page
    pub fn remove(&mut self, page_id: PageId) {
        if let Some(pos) = self.index.remove(&page_id) {
            self.unlink(pos);
            self.vacant.push(pos);
        }
    }

    /// Remove and return the least recently used page
    pub fn pop_lru(&mut self) -> Option<PageId> {
        if self.tail == NIL {
            return None;
        }
        let page_id = self.slots[self.tail].page_id;
        self.remove(page_id);
        Some(page_id)
    }

    /// Number of tracked pages (test only)
    #[cfg(test)]
    fn len(&self) -> usize {
        self.index.len()
    }

    fn push_front(&mut self, pos: usize) {
        self.slots[pos].prev = NIL;
        self.slots[pos].next = self.head;
        if self.head != NIL {
            self.slots[self.head].prev = pos;
        }
        self.head = pos;
        if self.tail == NIL {
            self.tail = pos;
        }
    }

    fn unlink(&mut self, pos: usize) {
        let Slot { prev, next, .. } = self.slots[pos];
        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next].prev = prev;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> PageId {
        PageId::new(n)
    }

    #[test]
    fn test_lru_order() {
        let mut lru = LruList::new(3);
        lru.touch(id(1));
        lru.touch(id(2));
        lru.touch(id(3));

        // 1 becomes most recent, so 2 is evicted first
        lru.touch(id(1));
        assert_eq!(lru.pop_lru(), Some(id(2)));
        assert_eq!(lru.pop_lru(), Some(id(3)));
        assert_eq!(lru.pop_lru(), Some(id(1)));
        assert_eq!(lru.pop_lru(), None);
    }

    #[test]
    fn test_lru_remove_and_reuse_slot() {
        let mut lru = LruList::new(3);
        lru.touch(id(1));
        lru.touch(id(2));
        lru.touch(id(3));

        lru.remove(id(2));
        assert_eq!(lru.len(), 2);
        lru.remove(id(42));

        lru.touch(id(4));
        assert_eq!(lru.len(), 3);
        assert_eq!(lru.pop_lru(), Some(id(1)));
        assert_eq!(lru.pop_lru(), Some(id(3)));
        assert_eq!(lru.pop_lru(), Some(id(4)));
    }

    #[test]
    fn test_lru_empty() {
        let mut lru = LruList::new(0);
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.pop_lru(), None);
    }
}
