//! Stash Core Library
//!
//! This crate provides the configuration, backend kind, and object key helpers
//! shared by the storage client and the command-line tool.

pub mod config;
pub mod keys;
pub mod storage_types;

// Re-export commonly used types
pub use config::StorageConfig;
pub use keys::{is_forbidden_delete_filename, object_key, public_url, FORBIDDEN_DELETE_FILENAMES};
pub use storage_types::StorageBackend;
