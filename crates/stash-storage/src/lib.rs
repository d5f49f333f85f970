//! Stash Storage Library
//!
//! This crate provides the `StorageClient` facade and the `ObjectBackend`
//! capability it delegates to, with an implementation over the `object_store`
//! crate (S3-compatible services and an in-memory store).
//!
//! # Object key format
//!
//! Every operation addresses an object as `{location}/{filename}` inside the
//! configured bucket, and the public URL of an object is
//! `{public_base_url}/{location}/{filename}`. Key generation lives in
//! `stash_core::keys` so the client and any other caller stay consistent.

pub mod backend;
pub mod client;
pub mod error;
pub mod factory;
pub mod object_store_backend;

// Re-export commonly used types
pub use backend::{ObjectBackend, ObjectBody, ObjectEntry};
pub use client::{FetchedObject, Listing, StorageClient, LIST_PAGE_SIZE};
pub use error::{BackendError, BackendResult, StorageError, StorageResult};
pub use factory::create_client;
pub use object_store_backend::ObjectStoreBackend;
pub use stash_core::{StorageBackend, StorageConfig};
