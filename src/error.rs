//! Error types for the storage engine.

use crate::types::PageId;
use thiserror::Error;

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur in the storage engine
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O error from the underlying file system
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page is not live in the page store
    #[error("Page {0} not found")]
    PageNotFound(PageId),

    /// Key exceeds maximum allowed size
    #[error("Key too large: {size} bytes (max: {max})")]
    KeyTooLarge { size: usize, max: usize },

    /// Value exceeds maximum allowed size
    #[error("Value too large: {size} bytes (max: {max})")]
    ValueTooLarge { size: usize, max: usize },

    /// The empty key is reserved for the leftmost sentinel entry
    #[error("Empty keys are not allowed")]
    EmptyKey,

    /// A page carries a type tag that is neither leaf nor internal
    #[error("Invalid node type tag: {0}")]
    InvalidNodeType(u16),

    /// A node does not fit its page
    #[error("Node overflow: {size} bytes encoded, page size is {page_size}")]
    NodeOverflow { size: usize, page_size: usize },

    /// Tree configuration fails a startup size check
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data corruption detected (e.g., checksum mismatch)
    #[error("Corruption detected: {0}")]
    Corruption(String),

    /// Invalid operation for the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Database file is corrupted or has invalid format
    #[error("Invalid database file: {0}")]
    InvalidDatabaseFile(String),
}

impl StorageError {
    /// Create a corruption error with a message
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid operation error
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    /// Create an invalid database file error
    pub fn invalid_db(msg: impl Into<String>) -> Self {
        Self::InvalidDatabaseFile(msg.into())
    }

    /// Whether this error reports a broken invariant rather than a
    /// transient store failure.
    ///
    /// Fatal errors mean the on-page data or the configuration no longer
    /// matches what the tree assumes; retrying the same operation will not
    /// help.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidNodeType(_)
                | Self::NodeOverflow { .. }
                | Self::InvalidConfig(_)
                | Self::Corruption(_)
        )
    }
}
