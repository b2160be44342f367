//! Free list management.
//!
//! Tracks released pages that can be reused for new allocations. Released
//! pages first sit on a pending list and only become reusable once
//! [`FreeList::reclaim`] runs, so older tree versions stay readable until
//! the owner decides no reader needs them. The list lives in memory; pages
//! freed before a restart are not recovered.

use crate::types::PageId;
use std::collections::VecDeque;

/// Manages free pages for reuse
#[derive(Debug, Default)]
pub struct FreeList {
    /// Pages ready to be handed out again
    ready: VecDeque<PageId>,
    /// Pages released since the last reclaim
    pending: Vec<PageId>,
}

impl FreeList {
    /// Create a new empty free list
    pub fn new() -> Self {
        Self::default()
    }

    /// Release a page; it becomes reusable after the next reclaim
    pub fn push(&mut self, page_id: PageId) {
        self.pending.push(page_id);
    }

    /// Get a reusable page, if available
    pub fn pop(&mut self) -> Option<PageId> {
        self.ready.pop_front()
    }

    /// Make every pending page reusable, returning them
    pub fn reclaim(&mut self) -> Vec<PageId> {
        let released = std::mem::take(&mut self.pending);
        self.ready.extend(released.iter().copied());
        released
    }

    /// Whether the page is already released (pending or ready)
    pub fn contains(&self, page_id: PageId) -> bool {
        self.pending.contains(&page_id) || self.ready.contains(&page_id)
    }

    /// Number of pages ready for reuse
    pub fn len(&self) -> usize {
        self.ready.len()
    }

    /// Number of pages waiting for reclaim
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is reusable right now
    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }
}
