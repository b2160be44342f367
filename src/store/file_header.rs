//! Database file header.
//!
//! The first page (page 0) of the database file contains metadata
//! about the database. Page 0 never holds a node, which is why page id 0
//! doubles as the invalid id.

use crate::error::{Result, StorageError};
use crate::types::PageId;

/// Magic bytes to identify a valid database file
pub const MAGIC: &[u8; 16] = b"CowBTreeStore01\0";

/// Number of header bytes covered by the checksum
const CHECKSUMMED_LEN: usize = 36;

/// Encoded size of the header fields
pub const FILE_HEADER_LEN: usize = CHECKSUMMED_LEN + 4;

/// Database file header
///
/// Layout (little-endian):
/// ```text
/// Offset  Size  Description
/// 0       16    Magic string "CowBTreeStore01\0"
/// 16      4     Page size
/// 20      8     Total page count (including this header page)
/// 28      8     Committed root page id (0 for an empty tree)
/// 36      4     Checksum of bytes 0..36 (CRC32)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Page size in bytes
    pub page_size: u32,
    /// Total number of pages in the file (including header page)
    pub page_count: u64,
    /// Root page of the last committed tree version
    pub root_page: PageId,
}

impl FileHeader {
    /// Create a new file header for an empty database
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size as u32,
            page_count: 1, // Just the header page initially
            root_page: PageId::INVALID,
        }
    }

    /// Read a file header from bytes
    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FILE_HEADER_LEN {
            return Err(StorageError::invalid_db("header too short"));
        }

        if &bytes[0..16] != MAGIC {
            return Err(StorageError::invalid_db("invalid magic bytes"));
        }

        let stored_checksum = u32::from_le_bytes(field(bytes, 36));
        let computed_checksum = crc32fast::hash(&bytes[0..CHECKSUMMED_LEN]);
        if stored_checksum != computed_checksum {
            return Err(StorageError::corruption("header checksum mismatch"));
        }

        Ok(Self {
            page_size: u32::from_le_bytes(field(bytes, 16)),
            page_count: u64::from_le_bytes(field(bytes, 20)),
            root_page: PageId::new(u64::from_le_bytes(field(bytes, 28))),
        })
    }

    /// Write this header to bytes, zeroing the rest of the slice
    pub fn write(&self, bytes: &mut [u8]) {
        bytes.fill(0);
        bytes[0..16].copy_from_slice(MAGIC);
        bytes[16..20].copy_from_slice(&self.page_size.to_le_bytes());
        bytes[20..28].copy_from_slice(&self.page_count.to_le_bytes());
        bytes[28..36].copy_from_slice(&self.root_page.value().to_le_bytes());

        let checksum = crc32fast::hash(&bytes[0..CHECKSUMMED_LEN]);
        bytes[36..40].copy_from_slice(&checksum.to_le_bytes());
    }

    /// Allocate a new page ID at the end of the file
    pub fn allocate_page(&mut self) -> PageId {
        let page_id = PageId::new(self.page_count);
        self.page_count += 1;
        page_id
    }
}

fn field<const N: usize>(bytes: &[u8], at: usize) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(&bytes[at..at + N]);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PAGE_SIZE;

    #[test]
    fn test_header_roundtrip() {
        let header = FileHeader {
            page_size: PAGE_SIZE as u32,
            page_count: 100,
            root_page: PageId::new(42),
        };

        let mut bytes = vec![0u8; PAGE_SIZE];
        header.write(&mut bytes);

        let restored = FileHeader::read(&bytes).unwrap();
        assert_eq!(restored, header);
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = vec![0u8; PAGE_SIZE];
        bytes[0..16].copy_from_slice(b"InvalidMagic0000");

        assert!(matches!(
            FileHeader::read(&bytes),
            Err(StorageError::InvalidDatabaseFile(_))
        ));
    }

    #[test]
    fn test_checksum_validation() {
        let header = FileHeader::new(PAGE_SIZE);
        let mut bytes = vec![0u8; PAGE_SIZE];
        header.write(&mut bytes);

        // Corrupt a byte of the page count
        bytes[20] ^= 0xFF;

        assert!(matches!(
            FileHeader::read(&bytes),
            Err(StorageError::Corruption(_))
        ));
    }

    #[test]
    fn test_allocate_page() {
        let mut header = FileHeader::new(PAGE_SIZE);
        assert_eq!(header.page_count, 1);
        assert_eq!(header.root_page, PageId::INVALID);

        let p1 = header.allocate_page();
        assert_eq!(p1, PageId::new(1));
        assert_eq!(header.page_count, 2);

        let p2 = header.allocate_page();
        assert_eq!(p2, PageId::new(2));
        assert_eq!(header.page_count, 3);
    }
}
