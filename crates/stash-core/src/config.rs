//! Configuration module
//!
//! Storage settings are read from the environment (and an optional `.env`
//! file) once at startup, validated, and handed to the client factory.

use std::env;
use std::fmt;

use crate::storage_types::StorageBackend;

/// Settings needed to reach the object store and to build public URLs.
#[derive(Clone, Default)]
pub struct StorageConfig {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub bucket: String,
    // Endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub api_endpoint_url: String,
    pub public_base_url: String,
    pub backend: StorageBackend,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::default(),
        };

        let config = StorageConfig {
            access_key: env::var("S3_ACCESS_KEY").unwrap_or_default(),
            secret_key: env::var("S3_SECRET_KEY").unwrap_or_default(),
            region: env::var("S3_REGION").unwrap_or_default(),
            bucket: env::var("S3_BUCKET").unwrap_or_default(),
            api_endpoint_url: env::var("S3_API_URL").unwrap_or_default(),
            public_base_url: env::var("S3_PUBLIC_URL").unwrap_or_default(),
            backend,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("S3_BUCKET must be set"));
        }

        if self.public_base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("S3_PUBLIC_URL must be set"));
        }

        match self.backend {
            StorageBackend::S3 => {
                let required = [
                    ("S3_ACCESS_KEY", &self.access_key),
                    ("S3_SECRET_KEY", &self.secret_key),
                    ("S3_REGION", &self.region),
                    ("S3_API_URL", &self.api_endpoint_url),
                ];
                for (name, value) in required {
                    if value.trim().is_empty() {
                        return Err(anyhow::anyhow!(
                            "{} must be set when using S3 storage backend",
                            name
                        ));
                    }
                }
                if !self.api_endpoint_url.starts_with("http://")
                    && !self.api_endpoint_url.starts_with("https://")
                {
                    return Err(anyhow::anyhow!(
                        "S3_API_URL must be an http:// or https:// URL"
                    ));
                }
            }
            StorageBackend::Memory => {}
        }

        Ok(())
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("api_endpoint_url", &self.api_endpoint_url)
            .field("public_base_url", &self.public_base_url)
            .field("backend", &self.backend)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s3_config() -> StorageConfig {
        StorageConfig {
            access_key: "AKIDEXAMPLE".to_string(),
            secret_key: "wJalrXUtnFEMI".to_string(),
            region: "us-east-1".to_string(),
            bucket: "assets".to_string(),
            api_endpoint_url: "http://localhost:9000".to_string(),
            public_base_url: "https://cdn.example.com".to_string(),
            backend: StorageBackend::S3,
        }
    }

    #[test]
    fn complete_s3_config_is_valid() {
        assert!(s3_config().validate().is_ok());
    }

    #[test]
    fn missing_bucket_is_rejected() {
        let config = StorageConfig {
            bucket: String::new(),
            ..s3_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("S3_BUCKET"));
    }

    #[test]
    fn missing_credentials_are_rejected_for_s3() {
        let config = StorageConfig {
            secret_key: "  ".to_string(),
            ..s3_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("S3_SECRET_KEY"));
    }

    #[test]
    fn endpoint_must_be_http_url() {
        let config = StorageConfig {
            api_endpoint_url: "localhost:9000".to_string(),
            ..s3_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn memory_backend_needs_only_bucket_and_public_url() {
        let config = StorageConfig {
            bucket: "assets".to_string(),
            public_base_url: "https://cdn.example.com".to_string(),
            backend: StorageBackend::Memory,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let rendered = format!("{:?}", s3_config());
        assert!(!rendered.contains("AKIDEXAMPLE"));
        assert!(!rendered.contains("wJalrXUtnFEMI"));
        assert!(rendered.contains("assets"));
    }
}
