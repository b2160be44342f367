//! Page identifier type.

use std::fmt;

/// Unique identifier for a page handed out by a page store.
///
/// Page id 0 is reserved: it never names a node. It doubles as the
/// "empty tree" root and, in the file store, as the file header page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PageId(pub u64);

impl PageId {
    /// Invalid page ID, used as a sentinel value
    pub const INVALID: PageId = PageId(0);

    /// Create a new page ID
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw page ID value
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Check if this is a valid page ID
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Calculate the byte offset of this page in a file
    pub const fn file_offset(self, page_size: usize) -> u64 {
        self.0 * page_size as u64
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "INVALID")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<u64> for PageId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<PageId> for u64 {
    fn from(id: PageId) -> Self {
        id.0
    }
}
