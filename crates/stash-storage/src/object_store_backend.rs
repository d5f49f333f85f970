use crate::backend::{ObjectBackend, ObjectBody, ObjectEntry};
use crate::error::{BackendError, BackendResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectMeta, ObjectStoreExt, PutPayload};
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt};

#[cfg(feature = "storage-s3")]
use crate::error::{StorageError, StorageResult};
#[cfg(feature = "storage-s3")]
use object_store::aws::{AmazonS3, AmazonS3Builder};
#[cfg(feature = "storage-s3")]
use stash_core::StorageConfig;

/// `ObjectBackend` over any `object_store` implementation bound to one bucket
#[derive(Debug)]
pub struct ObjectStoreBackend<S> {
    store: S,
    bucket: String,
    kind: StorageBackend,
}

#[cfg(feature = "storage-s3")]
impl ObjectStoreBackend<AmazonS3> {
    /// Create a backend for an S3-compatible service
    ///
    /// Credentials, region, and endpoint come from the config only; nothing is
    /// picked up from the ambient AWS environment. Plain `http://` endpoints
    /// (e.g. "http://localhost:9000" for MinIO) are allowed.
    pub fn s3(config: &StorageConfig) -> StorageResult<Self> {
        let allow_http = config.api_endpoint_url.starts_with("http://");

        let store = AmazonS3Builder::new()
            .with_access_key_id(config.access_key.as_str())
            .with_secret_access_key(config.secret_key.as_str())
            .with_region(config.region.as_str())
            .with_bucket_name(config.bucket.as_str())
            .with_endpoint(config.api_endpoint_url.as_str())
            .with_allow_http(allow_http)
            .build()
            .map_err(|e| StorageError::ConfigurationInvalid(e.to_string()))?;

        Ok(Self::with_store(store, config.bucket.clone(), StorageBackend::S3))
    }
}

impl ObjectStoreBackend<InMemory> {
    /// Create a backend that keeps objects in process memory
    pub fn in_memory(bucket: impl Into<String>) -> Self {
        Self::with_store(InMemory::new(), bucket, StorageBackend::Memory)
    }
}

impl<S: object_store::ObjectStore> ObjectStoreBackend<S> {
    pub fn with_store(store: S, bucket: impl Into<String>, kind: StorageBackend) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            kind,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn check_bucket(&self, bucket: &str) -> BackendResult<()> {
        if bucket != self.bucket {
            return Err(BackendError::UnknownBucket(bucket.to_string()));
        }
        Ok(())
    }
}

/// Parse `key` into a store path that keeps its exact text.
///
/// Keys with empty, `.` or `..` segments, or a leading or trailing `/`, would
/// be stored under a different name, so they are refused.
fn object_path(key: &str) -> BackendResult<Path> {
    match Path::parse(key) {
        Ok(path) if path.to_string() == key => Ok(path),
        _ => Err(BackendError::InvalidKey(key.to_string())),
    }
}

fn translate(err: ObjectStoreError) -> BackendError {
    match err {
        ObjectStoreError::NotFound { path, .. } => BackendError::NotFound(path),
        other => BackendError::Transport(other.to_string()),
    }
}

impl From<ObjectMeta> for ObjectEntry {
    fn from(meta: ObjectMeta) -> Self {
        ObjectEntry {
            key: meta.location.to_string(),
            size: meta.size,
            last_modified: meta.last_modified,
            e_tag: meta.e_tag,
        }
    }
}

#[async_trait]
impl<S: object_store::ObjectStore> ObjectBackend for ObjectStoreBackend<S> {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        mut body: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> BackendResult<()> {
        self.check_bucket(bucket)?;
        let location = object_path(key)?;
        let start = std::time::Instant::now();

        // Single put; the body is buffered in memory first.
        let mut buffer = Vec::new();
        body.read_to_end(&mut buffer).await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key = %key,
                "Failed to read object body"
            );
            BackendError::Io(e)
        })?;

        let size = buffer.len() as u64;

        self.store
            .put(&location, PutPayload::from(Bytes::from(buffer)))
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    backend = %self.kind,
                    bucket = %bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object put failed"
                );
                translate(e)
            })?;

        tracing::info!(
            backend = %self.kind,
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object put successful"
        );

        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> BackendResult<()> {
        self.check_bucket(bucket)?;
        let location = object_path(key)?;
        let start = std::time::Instant::now();

        self.store.delete(&location).await.map_err(|e| {
            tracing::error!(
                error = %e,
                backend = %self.kind,
                bucket = %bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object delete failed"
            );
            translate(e)
        })?;

        tracing::info!(
            backend = %self.kind,
            bucket = %bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object delete successful"
        );

        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> BackendResult<ObjectBody> {
        self.check_bucket(bucket)?;
        let location = object_path(key)?;
        let start = std::time::Instant::now();

        let result = self.store.get(&location).await.map_err(|e| {
            tracing::error!(
                error = %e,
                backend = %self.kind,
                bucket = %bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object get failed"
            );
            translate(e)
        })?;

        tracing::info!(
            backend = %self.kind,
            bucket = %bucket,
            key = %key,
            size_bytes = result.meta.size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object get successful"
        );

        let bucket = bucket.to_string();
        let key = key.to_string();
        let stream = result.into_stream().map(move |res| {
            res.map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    "Object body stream error"
                );
                translate(e)
            })
        });

        Ok(ObjectBody::new(Box::pin(stream)))
    }

    async fn list(&self, bucket: &str, max_keys: usize) -> BackendResult<Vec<ObjectEntry>> {
        self.check_bucket(bucket)?;
        let start = std::time::Instant::now();

        let metas: Vec<ObjectMeta> = object_store::ObjectStore::list(&self.store, None)
            .take(max_keys)
            .try_collect()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    backend = %self.kind,
                    bucket = %bucket,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object list failed"
                );
                translate(e)
            })?;

        tracing::info!(
            backend = %self.kind,
            bucket = %bucket,
            count = metas.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object list successful"
        );

        Ok(metas.into_iter().map(ObjectEntry::from).collect())
    }

    fn backend_type(&self) -> StorageBackend {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(data: &'static [u8]) -> Pin<Box<dyn AsyncRead + Send + Unpin>> {
        Box::pin(std::io::Cursor::new(data))
    }

    #[tokio::test]
    async fn put_then_get_round_trips_body() {
        let backend = ObjectStoreBackend::in_memory("assets");

        backend
            .put("assets", "images/logo.png", reader(b"png bytes"))
            .await
            .unwrap();

        let body = backend.get("assets", "images/logo.png").await.unwrap();
        assert_eq!(body.bytes().await.unwrap(), Bytes::from_static(b"png bytes"));
    }

    #[tokio::test]
    async fn get_missing_object_is_not_found() {
        let backend = ObjectStoreBackend::in_memory("assets");

        let result = backend.get("assets", "images/missing.png").await;
        assert!(matches!(result, Err(BackendError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_missing_object_follows_store_semantics() {
        let backend = ObjectStoreBackend::in_memory("assets");

        assert!(backend.delete("assets", "images/missing.png").await.is_ok());
    }

    #[tokio::test]
    async fn delete_removes_object() {
        let backend = ObjectStoreBackend::in_memory("assets");
        backend
            .put("assets", "docs/report.pdf", reader(b"%PDF"))
            .await
            .unwrap();

        backend.delete("assets", "docs/report.pdf").await.unwrap();

        let result = backend.get("assets", "docs/report.pdf").await;
        assert!(matches!(result, Err(BackendError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_is_capped_at_max_keys() {
        let backend = ObjectStoreBackend::in_memory("assets");
        for i in 0..15 {
            backend
                .put("assets", &format!("files/{:02}.txt", i), reader(b"x"))
                .await
                .unwrap();
        }

        let entries = backend.list("assets", 10).await.unwrap();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].key, "files/00.txt");
        assert_eq!(entries[0].size, 1);
    }

    #[tokio::test]
    async fn other_buckets_are_rejected() {
        let backend = ObjectStoreBackend::in_memory("assets");

        let result = backend.put("other", "a/b", reader(b"x")).await;
        assert!(matches!(result, Err(BackendError::UnknownBucket(_))));

        let result = backend.list("other", 10).await;
        assert!(matches!(result, Err(BackendError::UnknownBucket(_))));
    }

    #[tokio::test]
    async fn keys_are_stored_verbatim() {
        let backend = ObjectStoreBackend::in_memory("assets");
        for key in ["docs/100%.pdf", "images/logo (1).png", "a/b c/d+e.txt"] {
            backend.put("assets", key, reader(b"x")).await.unwrap();
        }

        let keys: Vec<String> = backend
            .list("assets", 10)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(keys, vec!["a/b c/d+e.txt", "docs/100%.pdf", "images/logo (1).png"]);

        let body = backend.get("assets", "docs/100%.pdf").await.unwrap();
        assert_eq!(body.bytes().await.unwrap(), Bytes::from_static(b"x"));
        backend.delete("assets", "docs/100%.pdf").await.unwrap();
        assert_eq!(backend.list("assets", 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn keys_that_would_be_rewritten_are_rejected() {
        let backend = ObjectStoreBackend::in_memory("assets");
        let keys = [
            "images//logo.png",
            "docs/a/../b.txt",
            "docs/./b.txt",
            "/root/x.txt",
            "images/",
        ];

        for key in keys {
            let result = backend.put("assets", key, reader(b"x")).await;
            assert!(
                matches!(result, Err(BackendError::InvalidKey(ref k)) if k == key),
                "{key:?} should be rejected"
            );
            assert!(matches!(
                backend.get("assets", key).await,
                Err(BackendError::InvalidKey(_))
            ));
            assert!(matches!(
                backend.delete("assets", key).await,
                Err(BackendError::InvalidKey(_))
            ));
        }

        assert!(backend.list("assets", 10).await.unwrap().is_empty());
    }

    #[test]
    fn backend_type_reflects_store() {
        let backend = ObjectStoreBackend::in_memory("assets");
        assert_eq!(backend.backend_type(), StorageBackend::Memory);
        assert_eq!(backend.bucket(), "assets");
    }

    #[cfg(feature = "storage-s3")]
    #[test]
    fn s3_backend_builds_from_config() {
        let config = StorageConfig {
            access_key: "AKIDEXAMPLE".to_string(),
            secret_key: "secret".to_string(),
            region: "us-east-1".to_string(),
            bucket: "assets".to_string(),
            api_endpoint_url: "http://localhost:9000".to_string(),
            public_base_url: "https://cdn.example.com".to_string(),
            backend: StorageBackend::S3,
        };

        let backend = ObjectStoreBackend::s3(&config).unwrap();
        assert_eq!(backend.backend_type(), StorageBackend::S3);
        assert_eq!(backend.bucket(), "assets");
    }
}
