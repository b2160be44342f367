//! Node layer: the binary codec for tree nodes.
//!
//! Each node occupies one fixed-size page:
//! - A 4-byte header holds the node type and entry count
//! - A pointer table holds one child page id per entry (zeroed in leaves)
//! - An offset table records where each entry ends
//! - The entries follow, each a 2-byte key length, a 2-byte value length,
//!   the key bytes and the value bytes
//!
//! All integers are little-endian.

mod build;
mod header;
mod layout;
mod search;

pub use header::NodeHeader;
pub use layout::Node;
