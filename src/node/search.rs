//! Floor lookup, the navigation primitive shared by reads and inserts.

use crate::node::Node;

impl Node {
    /// Index of the last entry whose key is `<= key`.
    ///
    /// Entry 0 is never compared: its key is a copy of the separator that
    /// led here (or the empty sentinel of the leftmost leaf), so it is
    /// always a valid floor and is returned when nothing else qualifies.
    /// Keys compare as unsigned bytes, a proper prefix sorting first.
    pub fn lookup_floor(&self, key: &[u8]) -> usize {
        let count = self.key_count();
        if count <= 1 {
            return 0;
        }
        // Keys are sorted, so entries 1.. split into a `<= key` run and a
        // `> key` run; the length of the first run is the floor index.
        let (mut low, mut high) = (1, count);
        while low < high {
            let mid = low + (high - low) / 2;
            if self.key(mid) <= key {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        low - 1
    }
}
