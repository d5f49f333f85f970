use crate::{
    ObjectBackend, ObjectStoreBackend, StorageBackend, StorageClient, StorageError, StorageResult,
};
use stash_core::StorageConfig;

/// Create a storage client based on configuration
///
/// The configuration is validated here, once, so a returned client is always
/// fully formed.
pub fn create_client(config: &StorageConfig) -> StorageResult<StorageClient> {
    config
        .validate()
        .map_err(|e| StorageError::ConfigurationInvalid(e.to_string()))?;

    let backend: Box<dyn ObjectBackend> = match config.backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => Box::new(ObjectStoreBackend::s3(config)?),

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => {
            return Err(StorageError::ConfigurationInvalid(
                "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
            ))
        }

        StorageBackend::Memory => Box::new(ObjectStoreBackend::in_memory(config.bucket.clone())),
    };

    tracing::info!(
        backend = %config.backend,
        bucket = %config.bucket,
        public_base_url = %config.public_base_url,
        "Storage client initialized"
    );

    StorageClient::new(config.bucket.clone(), config.public_base_url.clone(), backend)
}
