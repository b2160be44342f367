//! # Copy-on-Write B+ Tree
//!
//! A page-oriented, copy-on-write B+ tree for embedded key-value indexes.
//! Nodes are fixed-size pages that are never modified once written; every
//! insert writes new versions of the nodes on its path and frees the old
//! ones, so an older root stays readable until its pages are reclaimed.
//!
//! ## Architecture
//!
//! - **Node Layer** (`node`): binary node layout, floor lookup, node building
//! - **Store Layer** (`store`): the `PageStore` contract with in-memory,
//!   file-backed and cached implementations
//! - **B-Tree Layer** (`btree`): lookup, insert with splitting, range scans
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cow_btree::{Db, Config};
//!
//! let config = Config::new("my_database.db");
//! let db = Db::open(config)?;
//!
//! // Put a key-value pair
//! db.put(b"hello", b"world")?;
//!
//! // Get a value
//! let value = db.get(b"hello")?;
//!
//! // Range scan
//! for (key, value) in db.range(Some(b"a"), Some(b"z"))? {
//!     println!("{:?} -> {:?}", key, value);
//! }
//! ```
//!
//! The tree itself runs over any [`PageStore`]:
//!
//! ```rust,ignore
//! use cow_btree::{BTree, MemoryStore, TreeConfig};
//!
//! let mut tree = BTree::new(MemoryStore::default(), TreeConfig::default())?;
//! tree.insert(b"key", b"value")?;
//! ```

pub mod btree;
pub mod error;
pub mod node;
pub mod store;
pub mod types;

pub use error::{Result, StorageError};
pub use types::{NodeType, PageId, TreeConfig, PAGE_SIZE};

// Re-export main public API
pub use btree::{BTree, TreeStats};
pub use node::Node;
pub use store::{CacheStats, CachedStore, FileStore, MemoryStore, PageStore};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Database configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the database file
    pub path: PathBuf,
    /// Node cache size in number of pages (default: 1000)
    pub cache_capacity: usize,
    /// Whether to sync writes immediately (default: false for performance)
    pub sync_on_write: bool,
    /// Page geometry and entry limits
    pub tree_config: TreeConfig,
}

impl Config {
    /// Create a new configuration with default settings
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            cache_capacity: 1000,
            sync_on_write: false,
            tree_config: TreeConfig::default(),
        }
    }

    /// Set node cache size
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Enable sync on write for durability
    pub fn sync_on_write(mut self, enabled: bool) -> Self {
        self.sync_on_write = enabled;
        self
    }

    /// Set page geometry
    pub fn tree_config(mut self, config: TreeConfig) -> Self {
        self.tree_config = config;
        self
    }
}

/// Node type for visualization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Page ID
    pub page_id: u64,
    /// Whether this is a leaf node
    pub is_leaf: bool,
    /// Encoded size in bytes
    pub size: usize,
    /// Keys in this node
    pub keys: Vec<String>,
    /// Values (only for leaf nodes)
    pub values: Vec<String>,
    /// Child nodes (only for internal nodes)
    pub children: Vec<TreeNode>,
}

type SharedStore = Arc<CachedStore<FileStore>>;

/// Main database handle providing key-value storage backed by a
/// copy-on-write B+ tree in a single file.
///
/// Writers are serialized by an internal lock. After every `put` the new
/// root is recorded in the file header and replaced pages become reusable.
pub struct Db {
    btree: RwLock<BTree<SharedStore>>,
    store: SharedStore,
    config: Config,
}

impl Db {
    /// Open or create a database at the given path
    pub fn open(config: Config) -> Result<Self> {
        config.tree_config.validate()?;

        let file = FileStore::open(
            &config.path,
            config.tree_config.page_size,
            config.sync_on_write,
        )?;
        let root = file.root();
        let store = Arc::new(CachedStore::new(file, config.cache_capacity));
        let btree = BTree::open(Arc::clone(&store), root, config.tree_config)?;

        tracing::info!(path = %config.path.display(), root = %root, "database opened");

        Ok(Self {
            btree: RwLock::new(btree),
            store,
            config,
        })
    }

    /// Get the current tree configuration
    pub fn tree_config(&self) -> TreeConfig {
        self.config.tree_config
    }

    /// Get a value by key
    ///
    /// Returns `None` if the key does not exist.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let btree = self.btree.read();
        btree.get(key)
    }

    /// Insert or update a key-value pair
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut btree = self.btree.write();
        let root = btree.insert(key, value)?;
        self.store.inner().set_root(root)?;
        // no reader can still hold the old root while the write lock is held
        self.store.inner().reclaim();
        Ok(())
    }

    /// Check if a key exists
    pub fn contains(&self, key: &[u8]) -> Result<bool> {
        let btree = self.btree.read();
        Ok(btree.get(key)?.is_some())
    }

    /// Iterate over all key-value pairs in sorted order
    pub fn iter(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let btree = self.btree.read();
        btree.scan(None, None)
    }

    /// Iterate over key-value pairs in a range
    ///
    /// Both bounds are optional; `None` means unbounded on that side.
    pub fn range(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let btree = self.btree.read();
        btree.scan(start, end)
    }

    /// Flush the file header and sync all pages to disk
    pub fn flush(&self) -> Result<()> {
        self.store.inner().sync()
    }

    /// Check the tree structure
    pub fn verify(&self) -> Result<TreeStats> {
        let btree = self.btree.read();
        btree.verify()
    }

    /// Debug trace a key lookup
    pub fn debug_get(&self, key: &[u8]) -> Result<Vec<String>> {
        let btree = self.btree.read();
        btree.debug_get(key)
    }

    /// Get statistics about the database
    pub fn stats(&self) -> Result<DbStats> {
        let btree = self.btree.read();
        let file = self.store.inner();
        let cache = self.store.stats();
        Ok(DbStats {
            page_count: file.header().page_count,
            free_pages: file.free_pages(),
            root_page: btree.root().value(),
            tree_height: btree.height()?,
            cache_hits: cache.hits,
            cache_misses: cache.misses,
            cache_capacity: cache.capacity,
        })
    }

    /// Export the tree structure for visualization
    pub fn export_tree(&self) -> Result<Option<TreeNode>> {
        let btree = self.btree.read();
        if btree.is_empty() {
            return Ok(None);
        }
        self.export_node(btree.root()).map(Some)
    }

    fn export_node(&self, page_id: PageId) -> Result<TreeNode> {
        let node = self.store.get(page_id)?;
        let count = node.key_count();
        let keys = (0..count)
            .map(|i| String::from_utf8_lossy(node.key(i)).to_string())
            .collect();

        let (values, children) = if node.is_leaf() {
            let values = (0..count)
                .map(|i| String::from_utf8_lossy(node.value(i)).to_string())
                .collect();
            (values, Vec::new())
        } else {
            let children = (0..count)
                .map(|i| self.export_node(node.pointer(i)))
                .collect::<Result<Vec<_>>>()?;
            (Vec::new(), children)
        };

        Ok(TreeNode {
            page_id: page_id.value(),
            is_leaf: node.is_leaf(),
            size: node.encoded_size(),
            keys,
            values,
            children,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    /// Total number of pages in the file, header page included
    pub page_count: u64,
    /// Pages ready for reuse
    pub free_pages: usize,
    /// Current root page (0 for an empty tree)
    pub root_page: u64,
    /// Height of the tree
    pub tree_height: usize,
    /// Node reads served from the cache
    pub cache_hits: u64,
    /// Node reads that went to the file
    pub cache_misses: u64,
    /// Node cache capacity
    pub cache_capacity: usize,
}
