//! Object backend abstraction
//!
//! This module defines the `ObjectBackend` trait that the storage client
//! delegates every remote operation to, plus the value types crossing it.

use crate::error::{BackendError, BackendResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use serde::Serialize;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncRead;

/// Boxed stream of object body chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = BackendResult<Bytes>> + Send>>;

/// One row of a bucket listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
}

/// Body of a fetched object.
///
/// The caller owns it; dropping it releases the underlying connection.
pub struct ObjectBody {
    stream: ByteStream,
}

impl ObjectBody {
    pub fn new(stream: ByteStream) -> Self {
        Self { stream }
    }

    /// Body backed by bytes already in memory
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let stream = futures::stream::once(async move { Ok::<_, BackendError>(data) });
        Self::new(Box::pin(stream))
    }

    /// Read the whole body into memory
    pub async fn bytes(mut self) -> BackendResult<Bytes> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer.freeze())
    }
}

impl Stream for ObjectBody {
    type Item = BackendResult<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.poll_next_unpin(cx)
    }
}

impl fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBody").finish_non_exhaustive()
    }
}

/// Object backend abstraction trait
///
/// The storage client only ever talks to a remote store through this trait,
/// so S3, the in-memory store, and test doubles are interchangeable.
/// Implementations apply their store's native semantics unchanged: no
/// retries, no caching, no translation of "missing" into success or failure.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Store `body` at `key`, replacing any existing object.
    ///
    /// The reader is consumed until EOF.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> BackendResult<()>;

    /// Remove the object at `key`
    async fn delete(&self, bucket: &str, key: &str) -> BackendResult<()>;

    /// Open the object at `key` for streaming reads
    async fn get(&self, bucket: &str, key: &str) -> BackendResult<ObjectBody>;

    /// Return at most `max_keys` entries from the start of the bucket
    async fn list(&self, bucket: &str, max_keys: usize) -> BackendResult<Vec<ObjectEntry>>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
