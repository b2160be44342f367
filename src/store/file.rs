//! File-backed page store.
//!
//! Pages live at `page_id * page_size` in a single file. Page 0 holds the
//! [`FileHeader`]; node pages start at 1.

use crate::error::{Result, StorageError};
use crate::node::Node;
use crate::store::{FileHeader, FreeList, PageStore};
use crate::types::PageId;
use parking_lot::{Mutex, RwLock};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Page store over a single database file
pub struct FileStore {
    /// The database file
    file: RwLock<File>,
    /// The file header (cached)
    header: RwLock<FileHeader>,
    /// Free list for page reuse
    free_list: Mutex<FreeList>,
    /// Page size in bytes
    page_size: usize,
    /// Whether to sync on each write
    sync_on_write: bool,
}

impl FileStore {
    /// Open or create a database file with pages of `page_size` bytes
    pub fn open(path: &Path, page_size: usize, sync_on_write: bool) -> Result<Self> {
        let exists = path.exists();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let header = if exists && file.metadata()?.len() >= page_size as u64 {
            let mut file_ref = &file;
            let mut buf = vec![0u8; page_size];
            file_ref.read_exact(&mut buf)?;
            let header = FileHeader::read(&buf)?;
            if header.page_size as usize != page_size {
                return Err(StorageError::invalid_db(format!(
                    "file uses {} byte pages, expected {}",
                    header.page_size, page_size
                )));
            }
            header
        } else {
            let header = FileHeader::new(page_size);
            let mut buf = vec![0u8; page_size];
            header.write(&mut buf);

            let mut file_ref = &file;
            file_ref.seek(SeekFrom::Start(0))?;
            file_ref.write_all(&buf)?;
            file_ref.sync_all()?;

            header
        };

        tracing::debug!(
            path = %path.display(),
            page_count = header.page_count,
            root = %header.root_page,
            "opened page file"
        );

        Ok(Self {
            file: RwLock::new(file),
            header: RwLock::new(header),
            free_list: Mutex::new(FreeList::new()),
            page_size,
            sync_on_write,
        })
    }

    /// Page size of this file
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Get the file header
    pub fn header(&self) -> FileHeader {
        *self.header.read()
    }

    /// Root page recorded by the last [`FileStore::set_root`]
    pub fn root(&self) -> PageId {
        self.header.read().root_page
    }

    /// Record the committed root page in the file header
    pub fn set_root(&self, page_id: PageId) -> Result<()> {
        self.header.write().root_page = page_id;
        self.flush_header()
    }

    /// Make pages freed since the last call reusable.
    ///
    /// Returns the number of pages reclaimed.
    pub fn reclaim(&self) -> usize {
        let released = self.free_list.lock().reclaim();
        if !released.is_empty() {
            tracing::debug!(pages = released.len(), "reclaimed freed pages");
        }
        released.len()
    }

    /// Number of pages ready for reuse
    pub fn free_pages(&self) -> usize {
        self.free_list.lock().len()
    }

    /// Flush the header and sync all data to disk
    pub fn sync(&self) -> Result<()> {
        self.flush_header()?;
        let file = self.file.write();
        file.sync_all()?;
        Ok(())
    }

    /// Flush the header to disk
    fn flush_header(&self) -> Result<()> {
        let header = self.header.read();
        let mut buf = vec![0u8; self.page_size];
        header.write(&mut buf);

        let mut file = self.file.write();
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&buf)?;

        if self.sync_on_write {
            file.sync_data()?;
        }

        Ok(())
    }

    fn write_page(&self, page_id: PageId, data: &[u8]) -> Result<()> {
        let offset = page_id.file_offset(self.page_size);

        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;

        if self.sync_on_write {
            file.sync_data()?;
        }

        Ok(())
    }
}

impl PageStore for FileStore {
    fn get(&self, page_id: PageId) -> Result<Node> {
        if !page_id.is_valid() {
            return Err(StorageError::invalid_operation(
                "cannot read header page as a node",
            ));
        }

        if page_id.value() >= self.header.read().page_count {
            return Err(StorageError::PageNotFound(page_id));
        }

        let offset = page_id.file_offset(self.page_size);
        let mut buf = vec![0u8; self.page_size];

        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(&mut buf)?;
        drop(file);

        Node::from_bytes(buf)
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
                "page data must be {} bytes, got {}",
                self.page_size,
                node.capacity()
            )));
        }

        // First try the free list
        let reused = self.free_list.lock().pop();
        let page_id = match reused {
            Some(page_id) => page_id,
            None => self.header.write().allocate_page(),
        };

        self.write_page(page_id, node.as_bytes())?;
        if reused.is_none() {
            self.flush_header()?;
        }

        Ok(page_id)
    }

    fn free(&self, page_id: PageId) -> Result<()> {
        if !page_id.is_valid() {
            return Err(StorageError::invalid_operation(
                "cannot deallocate header page",
            ));
        }
        if page_id.value() >= self.header.read().page_count {
            return Err(StorageError::PageNotFound(page_id));
        }

        let mut free_list = self.free_list.lock();
        if free_list.contains(page_id) {
            return Err(StorageError::invalid_operation(format!(
                "page {} freed twice",
                page_id
            )));
        }
        free_list.push(page_id);
        Ok(())
    }
}
