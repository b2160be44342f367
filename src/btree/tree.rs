//! Copy-on-write B+ tree over a [`PageStore`].
//!
//! The tree never edits a page it has already written. An insert rebuilds
//! every node on the path from the root to the target leaf, writes the new
//! versions under fresh page ids, and frees the old ones. The previous root
//! keeps describing the tree as it was until its pages are reclaimed.
//!
//! The leftmost leaf always starts with an empty-key sentinel entry, so
//! every key has a floor at every level.

use crate::btree::split::split;
use crate::error::{Result, StorageError};
use crate::node::Node;
use crate::store::PageStore;
use crate::types::{NodeType, PageId, TreeConfig};

/// Shape of a tree as seen by [`BTree::verify`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Pages reachable from the root
    pub pages: usize,
    /// User entries, the sentinel excluded
    pub entries: usize,
    /// Levels from root to leaf
    pub height: usize,
}

/// A copy-on-write B+ tree
pub struct BTree<S: PageStore> {
    store: S,
    /// Root page ID (INVALID means empty tree)
    root: PageId,
    config: TreeConfig,
}

impl<S: PageStore> BTree<S> {
    /// Create an empty tree
    pub fn new(store: S, config: TreeConfig) -> Result<Self> {
        Self::open(store, PageId::INVALID, config)
    }

    /// Open the tree rooted at `root` (INVALID for an empty tree)
    pub fn open(store: S, root: PageId, config: TreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            root,
            config,
        })
    }

    /// Current root page
    pub fn root(&self) -> PageId {
        self.root
    }

    /// Page geometry of this tree
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// The underlying page store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether nothing was ever inserted
    pub fn is_empty(&self) -> bool {
        !self.root.is_valid()
    }

    /// Look up a key and return its value
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if self.is_empty() || key.is_empty() {
            return Ok(None);
        }
        self.search(self.root, key)
    }

    fn search(&self, page_id: PageId, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let node = self.store.get(page_id)?;
        let idx = node.lookup_floor(key);
        match node.node_type() {
            NodeType::Leaf if node.key(idx) == key => Ok(Some(node.value(idx).to_vec())),
            NodeType::Leaf => Ok(None),
            NodeType::Internal => self.search(node.pointer(idx), key),
        }
    }

    /// Insert or update a key-value pair.
    ///
    /// Returns the new root. On error the tree is left unchanged and the
    /// pages written so far are handed back to the store.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<PageId> {
        self.check_entry(key, value)?;

        let mut mutation = Mutation::new(&self.store, self.config.page_size);
        match self.insert_root(&mut mutation, key, value) {
            Ok(root) => {
                mutation.commit();
                self.root = root;
                Ok(root)
            }
            Err(err) => {
                mutation.rollback();
                Err(err)
            }
        }
    }

    fn check_entry(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(StorageError::EmptyKey);
        }
        if key.len() > self.config.max_key_size {
            return Err(StorageError::KeyTooLarge {
                size: key.len(),
                max: self.config.max_key_size,
            });
        }
        if value.len() > self.config.max_value_size {
            return Err(StorageError::ValueTooLarge {
                size: value.len(),
                max: self.config.max_value_size,
            });
        }
        Ok(())
    }

    fn insert_root(
        &self,
        mutation: &mut Mutation<'_, S>,
        key: &[u8],
        value: &[u8],
    ) -> Result<PageId> {
        let node = if self.is_empty() {
            let mut leaf = Node::scratch(NodeType::Leaf, 2, self.config.page_size);
            leaf.append_entry(0, PageId::INVALID, b"", b"");
            leaf.append_entry(1, PageId::INVALID, key, value);
            leaf
        } else {
            let root = self.store.get(self.root)?;
            mutation.retire(self.root);
            self.descend(mutation, root, key, value)?
        };

        let children = self.alloc_split(mutation, node)?;
        if let [(page_id, _)] = children.as_slice() {
            return Ok(*page_id);
        }

        let count = children.len() as u16;
        let mut root = Node::new(NodeType::Internal, count, self.config.page_size);
        for (i, (page_id, first_key)) in children.iter().enumerate() {
            root.append_entry(i, *page_id, first_key, b"");
        }
        tracing::debug!(children = children.len(), "tree grew a level");
        mutation.alloc(root)
    }

    /// Rebuild `node` with the entry applied below it. The result may be
    /// larger than a page.
    fn descend(
        &self,
        mutation: &mut Mutation<'_, S>,
        node: Node,
        key: &[u8],
        value: &[u8],
    ) -> Result<Node> {
        let idx = node.lookup_floor(key);
        match node.node_type() {
            NodeType::Leaf if node.key(idx) == key => {
                Ok(Node::leaf_update(&node, idx, key, value))
            }
            NodeType::Leaf => Ok(Node::leaf_insert(&node, idx + 1, key, value)),
            NodeType::Internal => {
                let child_id = node.pointer(idx);
                tracing::trace!(page = %child_id, index = idx, "descending");
                let child = self.store.get(child_id)?;
                mutation.retire(child_id);

                let rebuilt = self.descend(mutation, child, key, value)?;
                let children = self.alloc_split(mutation, rebuilt)?;
                let links: Vec<(PageId, &[u8])> = children
                    .iter()
                    .map(|(page_id, first_key)| (*page_id, first_key.as_slice()))
                    .collect();
                Ok(Node::replace_children(&node, idx, &links))
            }
        }
    }

    /// Split `node` and write every part, returning `(page id, first key)`
    /// per part in key order.
    fn alloc_split(
        &self,
        mutation: &mut Mutation<'_, S>,
        node: Node,
    ) -> Result<Vec<(PageId, Vec<u8>)>> {
        let parts = split(node, self.config.page_size)?;
        let mut children = Vec::with_capacity(parts.len());
        for part in parts {
            let first_key = part.key(0).to_vec();
            children.push((mutation.alloc(part)?, first_key));
        }
        Ok(children)
    }

    /// Scan a range of keys
    ///
    /// Returns all key-value pairs where start <= key < end, in key order.
    /// If start is None, scan from the beginning.
    /// If end is None, scan to the end.
    pub fn scan(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut results = Vec::new();
        if !self.is_empty() {
            self.scan_node(self.root, start, end, &mut results)?;
        }
        Ok(results)
    }

    fn scan_node(
        &self,
        page_id: PageId,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        results: &mut Vec<(Vec<u8>, Vec<u8>)>,
    ) -> Result<()> {
        let node = self.store.get(page_id)?;
        let count = node.key_count();
        // the subtree under entry i holds keys in [key(i), key(i + 1))
        let first = start.map_or(0, |start| node.lookup_floor(start));

        for i in first..count {
            let key = node.key(i);
            if end.is_some_and(|end| key >= end) {
                break;
            }
            if node.is_leaf() {
                let in_range = start.map_or(true, |start| key >= start);
                if in_range && !key.is_empty() {
                    results.push((key.to_vec(), node.value(i).to_vec()));
                }
            } else {
                self.scan_node(node.pointer(i), start, end, results)?;
            }
        }
        Ok(())
    }

    /// Number of levels (0 for an empty tree)
    pub fn height(&self) -> Result<usize> {
        let mut height = 0;
        let mut page_id = self.root;
        while page_id.is_valid() {
            let node = self.store.get(page_id)?;
            height += 1;
            page_id = if node.is_leaf() {
                PageId::INVALID
            } else {
                node.pointer(0)
            };
        }
        Ok(height)
    }

    /// Debug search - traces the path through the tree
    pub fn debug_get(&self, key: &[u8]) -> Result<Vec<String>> {
        let mut trace = Vec::new();
        if self.is_empty() {
            trace.push("Tree is empty".to_string());
            return Ok(trace);
        }

        trace.push(format!("Searching for key: {:?}", String::from_utf8_lossy(key)));
        let mut page_id = self.root;
        loop {
            let node = self.store.get(page_id)?;
            let idx = node.lookup_floor(key);
            trace.push(format!(
                "  Page {}: {:?}, {} keys, {} bytes",
                page_id,
                node.node_type(),
                node.key_count(),
                node.encoded_size()
            ));
            for i in 0..node.key_count() {
                let marker = if i == idx { "->" } else { "  " };
                let key_str = String::from_utf8_lossy(node.key(i));
                if node.is_leaf() {
                    trace.push(format!("   {} [{}] key={:?}", marker, i, key_str));
                } else {
                    trace.push(format!(
                        "   {} [{}] sep={:?} child={}",
                        marker,
                        i,
                        key_str,
                        node.pointer(i)
                    ));
                }
            }

            if node.is_leaf() {
                if !key.is_empty() && node.key(idx) == key {
                    trace.push(format!("  FOUND at index {}", idx));
                } else {
                    trace.push("  NOT FOUND in leaf".to_string());
                }
                return Ok(trace);
            }
            page_id = node.pointer(idx);
        }
    }

    /// Walk the whole tree and check its structure.
    ///
    /// Every node must fit a page and hold strictly increasing keys, every
    /// separator must equal its child's first key, the leftmost leaf must
    /// start with the sentinel, and all leaves must sit at the same depth.
    pub fn verify(&self) -> Result<TreeStats> {
        let mut stats = TreeStats::default();
        if self.is_empty() {
            return Ok(stats);
        }

        let mut leaf_depth = None;
        self.verify_node(self.root, Some(b"".as_slice()), None, 1, &mut leaf_depth, &mut stats)?;
        stats.height = leaf_depth.unwrap_or(0);
        Ok(stats)
    }

    fn verify_node(
        &self,
        page_id: PageId,
        first_key: Option<&[u8]>,
        upper: Option<&[u8]>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
        stats: &mut TreeStats,
    ) -> Result<()> {
        let node = self.store.get(page_id)?;
        let count = node.key_count();
        stats.pages += 1;

        if !node.fits(self.config.page_size) {
            return Err(StorageError::corruption(format!(
                "page {} encodes to {} bytes",
                page_id,
                node.encoded_size()
            )));
        }
        if let Some(first_key) = first_key {
            if node.key(0) != first_key {
                return Err(StorageError::corruption(format!(
                    "page {} starts with {:?}, parent expects {:?}",
                    page_id,
                    String::from_utf8_lossy(node.key(0)),
                    String::from_utf8_lossy(first_key)
                )));
            }
        }
        for i in 1..count {
            if node.key(i - 1) >= node.key(i) {
                return Err(StorageError::corruption(format!(
                    "page {} keys out of order at index {}",
                    page_id, i
                )));
            }
        }
        if upper.is_some_and(|upper| node.key(count - 1) >= upper) {
            return Err(StorageError::corruption(format!(
                "page {} holds keys past its parent's next separator",
                page_id
            )));
        }

        if node.is_leaf() {
            match *leaf_depth {
                Some(expected) if expected != depth => {
                    return Err(StorageError::corruption(format!(
                        "leaf {} at depth {}, others at {}",
                        page_id, depth, expected
                    )));
                }
                _ => *leaf_depth = Some(depth),
            }
            stats.entries += (0..count).filter(|&i| !node.key(i).is_empty()).count();
            return Ok(());
        }

        for i in 0..count {
            let next = if i + 1 < count {
                Some(node.key(i + 1))
            } else {
                upper
            };
            self.verify_node(
                node.pointer(i),
                Some(node.key(i)),
                next,
                depth + 1,
                leaf_depth,
                stats,
            )?;
        }
        Ok(())
    }
}

/// Page bookkeeping for one insert.
///
/// New pages are recorded as they are written and old path pages as they
/// are replaced. Old pages are only freed once every new page is written;
/// a failed insert frees the new ones instead.
struct Mutation<'a, S: PageStore> {
    store: &'a S,
    page_size: usize,
    allocated: Vec<PageId>,
    retired: Vec<PageId>,
}

impl<'a, S: PageStore> Mutation<'a, S> {
    fn new(store: &'a S, page_size: usize) -> Self {
        Self {
            store,
            page_size,
            allocated: Vec::new(),
            retired: Vec::new(),
        }
    }

    fn alloc(&mut self, node: Node) -> Result<PageId> {
        let node = node.commit(self.page_size)?;
        let page_id = self.store.alloc(node)?;
        self.allocated.push(page_id);
        Ok(page_id)
    }

    fn retire(&mut self, page_id: PageId) {
        self.retired.push(page_id);
    }

    fn commit(self) {
        tracing::trace!(
            allocated = self.allocated.len(),
            retired = self.retired.len(),
            "insert committed"
        );
        for page_id in self.retired {
            if let Err(err) = self.store.free(page_id) {
                tracing::warn!(page = %page_id, error = %err, "failed to free replaced page");
            }
        }
    }

    fn rollback(self) {
        for page_id in self.allocated {
            if let Err(err) = self.store.free(page_id) {
                tracing::warn!(page = %page_id, error = %err, "failed to free page of aborted insert");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreStats};
    use crate::types::{MAX_KEY_SIZE, MAX_VALUE_SIZE, PAGE_SIZE};
    use parking_lot::Mutex;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn create_test_btree() -> Result<BTree<Arc<MemoryStore>>> {
        BTree::new(Arc::new(MemoryStore::default()), TreeConfig::default())
    }

    fn small_page_btree() -> Result<BTree<Arc<MemoryStore>>> {
        BTree::new(
            Arc::new(MemoryStore::new(512)),
            TreeConfig::new(512, 32, 64),
        )
    }

    fn store_stats(tree: &BTree<Arc<MemoryStore>>) -> StoreStats {
        tree.store().stats()
    }

    #[test]
    fn test_btree_empty() -> Result<()> {
        let tree = create_test_btree()?;
        assert!(tree.is_empty());
        assert_eq!(tree.root(), PageId::INVALID);
        assert_eq!(tree.get(b"anything")?, None);
        assert_eq!(tree.get(b"")?, None);
        assert!(tree.scan(None, None)?.is_empty());
        assert_eq!(tree.height()?, 0);
        assert_eq!(tree.verify()?, TreeStats::default());
        Ok(())
    }

    #[test]
    fn test_small_inserts_stay_in_one_leaf() -> Result<()> {
        let mut tree = create_test_btree()?;
        tree.insert(b"b", b"2")?;
        tree.insert(b"a", b"1")?;
        tree.insert(b"c", b"3")?;

        assert_eq!(tree.height()?, 1);
        assert_eq!(tree.get(b"a")?, Some(b"1".to_vec()));
        assert_eq!(tree.get(b"b")?, Some(b"2".to_vec()));
        assert_eq!(tree.get(b"c")?, Some(b"3".to_vec()));
        assert_eq!(tree.get(b"d")?, None);

        // the root leaf is the only live page; each insert freed its predecessor
        let stats = store_stats(&tree);
        assert_eq!(stats.live_pages, 1);
        assert_eq!(stats.allocations, 3);
        assert_eq!(stats.frees, 2);

        let root = tree.store().get(tree.root())?;
        assert_eq!(root.key_count(), 4);
        assert_eq!(root.key(0), b"");
        Ok(())
    }

    #[test]
    fn test_update_replaces_value() -> Result<()> {
        let mut tree = create_test_btree()?;
        tree.insert(b"key", b"value1")?;
        tree.insert(b"key", b"value2")?;
        assert_eq!(tree.get(b"key")?, Some(b"value2".to_vec()));

        // same key and value again changes nothing visible
        tree.insert(b"key", b"value2")?;
        assert_eq!(tree.scan(None, None)?, vec![(b"key".to_vec(), b"value2".to_vec())]);
        assert_eq!(tree.verify()?.entries, 1);
        Ok(())
    }

    #[test]
    fn test_leaf_overflow_splits_at_middle() -> Result<()> {
        let mut tree = create_test_btree()?;
        let filler = vec![b'v'; 400];
        tree.insert(b"10", &filler)?;
        tree.insert(b"20", &filler)?;
        tree.insert(b"30", &filler)?;
        assert_eq!(tree.height()?, 1);

        tree.insert(b"40", &vec![b'w'; 3000])?;
        assert_eq!(tree.height()?, 2);

        let root = tree.store().get(tree.root())?;
        assert_eq!(root.node_type(), NodeType::Internal);
        assert_eq!(root.key_count(), 2);
        assert_eq!(root.key(0), b"");
        assert_eq!(root.key(1), b"20");

        let left = tree.store().get(root.pointer(0))?;
        let right = tree.store().get(root.pointer(1))?;
        assert_eq!(left.key_count(), 2);
        assert_eq!(left.key(1), b"10");
        assert_eq!(right.key_count(), 3);
        assert_eq!(right.key(0), root.key(1));
        assert_eq!(right.key(2), b"40");

        assert_eq!(tree.get(b"40")?.map(|v| v.len()), Some(3000));
        tree.verify()?;
        Ok(())
    }

    #[test]
    fn test_leaf_overflow_splits_in_three() -> Result<()> {
        let mut tree = create_test_btree()?;
        tree.insert(b"a", &vec![b'a'; 2000])?;
        tree.insert(b"c", &vec![b'c'; 2000])?;
        tree.insert(b"b", &vec![b'b'; 3000])?;

        let root = tree.store().get(tree.root())?;
        assert_eq!(root.key_count(), 3);
        assert_eq!(root.key(1), b"b");
        assert_eq!(root.key(2), b"c");
        for i in 0..3 {
            assert!(tree.store().get(root.pointer(i))?.is_leaf());
        }
        assert_eq!(tree.verify()?.entries, 3);
        Ok(())
    }

    #[test]
    fn test_entry_limits() -> Result<()> {
        let mut tree = create_test_btree()?;
        let big_value = vec![b'x'; MAX_VALUE_SIZE];
        for i in 0..4u8 {
            let key = vec![b'a' + i; MAX_KEY_SIZE];
            tree.insert(&key, &big_value)?;
        }
        assert_eq!(tree.verify()?.entries, 4);
        assert!(store_stats(&tree).max_alloc_size <= PAGE_SIZE);

        let root = tree.root();
        assert!(matches!(
            tree.insert(&vec![b'k'; MAX_KEY_SIZE + 1], b"v"),
            Err(StorageError::KeyTooLarge { .. })
        ));
        assert!(matches!(
            tree.insert(b"k", &vec![b'v'; MAX_VALUE_SIZE + 1]),
            Err(StorageError::ValueTooLarge { .. })
        ));
        assert!(matches!(tree.insert(b"", b"v"), Err(StorageError::EmptyKey)));
        assert_eq!(tree.root(), root);
        Ok(())
    }

    #[test]
    fn test_btree_scan() -> Result<()> {
        let mut tree = small_page_btree()?;
        for i in 0..300u32 {
            let key = format!("key{:04}", i);
            tree.insert(key.as_bytes(), &i.to_le_bytes())?;
        }
        assert!(tree.height()? > 1);

        let all = tree.scan(None, None)?;
        assert_eq!(all.len(), 300);
        assert!(all.windows(2).all(|w| w[0].0 < w[1].0));

        let range = tree.scan(Some(b"key0100"), Some(b"key0150"))?;
        assert_eq!(range.len(), 50);
        assert_eq!(range[0].0, b"key0100");
        assert_eq!(range[49].0, b"key0149");

        let tail = tree.scan(Some(b"key0295x"), None)?;
        assert_eq!(tail.len(), 4);
        assert!(tree.scan(Some(b"z"), None)?.is_empty());
        assert!(tree.scan(None, Some(b"key"))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_many_shuffled_inserts() -> Result<()> {
        let mut tree = small_page_btree()?;
        let mut rng = StdRng::seed_from_u64(7);
        let mut keys: Vec<u32> = (0..2000).collect();
        keys.shuffle(&mut rng);

        for &k in &keys {
            let value = vec![(k % 251) as u8; rng.gen_range(0..=64)];
            tree.insert(format!("{:08}", k).as_bytes(), &value)?;
        }

        let stats = tree.verify()?;
        assert_eq!(stats.entries, 2000);
        assert!(stats.height >= 3, "internal nodes should have split");
        assert_eq!(stats.height, tree.height()?);
        assert_eq!(store_stats(&tree).live_pages, stats.pages);
        assert!(store_stats(&tree).max_alloc_size <= 512);

        for k in (0..2000u32).step_by(37) {
            let value = tree.get(format!("{:08}", k).as_bytes())?;
            assert!(value.is_some_and(|v| v.iter().all(|&b| b == (k % 251) as u8)));
        }
        Ok(())
    }

    #[test]
    fn test_old_root_is_a_snapshot() -> Result<()> {
        let store = Arc::new(MemoryStore::new(512));
        let config = TreeConfig::new(512, 32, 64);
        let mut tree = BTree::new(Arc::clone(&store), config)?;
        for i in 0..100u32 {
            tree.insert(format!("k{:03}", i).as_bytes(), b"old")?;
        }
        let snapshot = BTree::open(Arc::clone(&store), tree.root(), config)?;

        for i in 0..100u32 {
            tree.insert(format!("k{:03}", i).as_bytes(), b"new")?;
        }
        tree.insert(b"k999", b"new")?;

        // freed pages are still readable before reclaim
        assert_eq!(snapshot.get(b"k050")?, Some(b"old".to_vec()));
        assert_eq!(snapshot.get(b"k999")?, None);
        assert_eq!(snapshot.verify()?.entries, 100);
        assert_eq!(tree.get(b"k050")?, Some(b"new".to_vec()));

        store.reclaim();
        assert_eq!(tree.verify()?.entries, 101);
        Ok(())
    }

    /// Memory store that fails allocations once its budget runs out
    struct FlakyStore {
        inner: MemoryStore,
        budget: Mutex<Option<usize>>,
    }

    impl PageStore for FlakyStore {
        fn get(&self, page_id: PageId) -> Result<Node> {
            self.inner.get(page_id)
        }

        fn alloc(&self, node: Node) -> Result<PageId> {
            if let Some(left) = self.budget.lock().as_mut() {
                if *left == 0 {
                    return Err(StorageError::invalid_operation("out of pages"));
                }
                *left -= 1;
            }
            self.inner.alloc(node)
        }

        fn free(&self, page_id: PageId) -> Result<()> {
            self.inner.free(page_id)
        }
    }

    #[test]
    fn test_failed_insert_rolls_back() -> Result<()> {
        let store = Arc::new(FlakyStore {
            inner: MemoryStore::new(512),
            budget: Mutex::new(None),
        });
        let mut tree = BTree::new(Arc::clone(&store), TreeConfig::new(512, 32, 64))?;
        for i in 0..200u32 {
            tree.insert(format!("k{:04}", i).as_bytes(), b"value")?;
        }
        assert!(tree.height()? >= 2);

        let root = tree.root();
        let before = store.inner.stats();

        // the leaf is written, the parent is not
        *store.budget.lock() = Some(1);
        assert!(tree.insert(b"k0100x", b"value").is_err());
        *store.budget.lock() = None;

        assert_eq!(tree.root(), root);
        let after = store.inner.stats();
        assert_eq!(after.live_pages, before.live_pages);
        assert_eq!(after.allocations, before.allocations + 1);
        assert_eq!(after.frees, before.frees + 1);
        assert_eq!(tree.get(b"k0100x")?, None);
        assert_eq!(tree.verify()?.entries, 200);

        tree.insert(b"k0100x", b"value")?;
        assert_eq!(tree.get(b"k0100x")?, Some(b"value".to_vec()));
        Ok(())
    }

    #[test]
    fn test_debug_get_traces_path() -> Result<()> {
        let mut tree = small_page_btree()?;
        for i in 0..100u32 {
            tree.insert(format!("k{:03}", i).as_bytes(), b"v")?;
        }
        let trace = tree.debug_get(b"k042")?;
        assert!(trace[0].contains("k042"));
        assert!(trace.iter().any(|line| line.contains("Internal")));
        assert!(trace.last().is_some_and(|line| line.starts_with("  FOUND")));

        let missing = tree.debug_get(b"k042x")?;
        assert_eq!(missing.last().map(String::as_str), Some("  NOT FOUND in leaf"));
        Ok(())
    }

    #[test]
    fn test_verify_detects_bad_separator() -> Result<()> {
        let store = Arc::new(MemoryStore::new(512));
        let config = TreeConfig::new(512, 32, 64);

        let mut leaf = Node::new(NodeType::Leaf, 2, 512);
        leaf.append_entry(0, PageId::INVALID, b"", b"");
        leaf.append_entry(1, PageId::INVALID, b"b", b"1");
        let left = store.alloc(leaf)?;

        let mut leaf = Node::new(NodeType::Leaf, 1, 512);
        leaf.append_entry(0, PageId::INVALID, b"c", b"2");
        let right = store.alloc(leaf)?;

        let mut root = Node::new(NodeType::Internal, 2, 512);
        root.append_entry(0, left, b"", b"");
        root.append_entry(1, right, b"bb", b"");
        let root = store.alloc(root)?;

        let tree = BTree::open(store, root, config)?;
        let err = tree.verify().unwrap_err();
        assert!(matches!(err, StorageError::Corruption(_)));
        Ok(())
    }
}
