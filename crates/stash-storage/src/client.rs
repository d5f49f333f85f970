//! Storage client facade
//!
//! `StorageClient` turns `(location, filename)` pairs into object keys and
//! public URLs, validates destructive and enumerative requests, and delegates
//! the remote work to an `ObjectBackend`.

use crate::backend::{ObjectBackend, ObjectBody, ObjectEntry};
use crate::error::{StorageError, StorageResult};
use crate::StorageBackend;
use regex::Regex;
use stash_core::keys::{is_forbidden_delete_filename, object_key, public_url};
use std::fmt;
use std::path::Path;
use tokio::fs::File;

/// Number of entries requested by `list`. Only this first page is inspected.
pub const LIST_PAGE_SIZE: usize = 10;

/// Object returned by `get`: the body stream plus its public URL
#[derive(Debug)]
pub struct FetchedObject {
    pub body: ObjectBody,
    pub public_url: String,
}

/// Result of `list`: one page of entries and the filter applied to them.
///
/// Filtering happens while iterating. Call `list` again for a fresh page.
#[derive(Debug, Clone)]
pub struct Listing {
    entries: Vec<ObjectEntry>,
    filter: Option<Regex>,
}

impl Listing {
    fn new(entries: Vec<ObjectEntry>, filter: Option<Regex>) -> Self {
        Self { entries, filter }
    }

    fn matches(filter: Option<&Regex>, entry: &ObjectEntry) -> bool {
        filter.map_or(true, |re| re.is_match(&entry.key))
    }

    /// Entries of the page that match the filter
    pub fn iter(&self) -> impl Iterator<Item = &ObjectEntry> + '_ {
        let filter = self.filter.as_ref();
        self.entries
            .iter()
            .filter(move |entry| Self::matches(filter, entry))
    }

    /// Number of entries fetched, before filtering
    pub fn page_len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_entries(self) -> Vec<ObjectEntry> {
        let Listing { entries, filter } = self;
        entries
            .into_iter()
            .filter(|entry| Self::matches(filter.as_ref(), entry))
            .collect()
    }
}

/// Facade over an object backend for one bucket.
///
/// Immutable after construction; share it across tasks behind an `Arc`.
pub struct StorageClient {
    bucket: String,
    public_base_url: String,
    backend: Box<dyn ObjectBackend>,
}

impl StorageClient {
    pub fn new(
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
        backend: Box<dyn ObjectBackend>,
    ) -> StorageResult<Self> {
        let bucket = bucket.into();
        if bucket.is_empty() {
            return Err(StorageError::ConfigurationInvalid(
                "bucket must not be empty".to_string(),
            ));
        }

        Ok(Self {
            bucket,
            public_base_url: public_base_url.into(),
            backend,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    pub fn backend_type(&self) -> StorageBackend {
        self.backend.backend_type()
    }

    /// Upload a local file to `{location}/{filename}` and return its public URL.
    ///
    /// The source is opened before anything is sent, so a missing or
    /// unreadable file never reaches the backend.
    pub async fn put(
        &self,
        source_path: impl AsRef<Path>,
        location: &str,
        filename: &str,
    ) -> StorageResult<String> {
        let source_path = source_path.as_ref();
        let file = File::open(source_path)
            .await
            .map_err(|e| StorageError::SourceUnavailable {
                path: source_path.to_path_buf(),
                source: e,
            })?;

        let key = object_key(location, filename);

        self.backend
            .put(&self.bucket, &key, Box::pin(file))
            .await
            .map_err(|e| StorageError::StoreWriteFailed {
                key: key.clone(),
                source: e,
            })?;

        let url = public_url(&self.public_base_url, &key);

        tracing::debug!(
            source = %source_path.display(),
            key = %key,
            url = %url,
            "Stored object"
        );

        Ok(url)
    }

    /// Delete `{location}/{filename}`.
    ///
    /// Rejects the wildcard and bare traversal filenames before calling the
    /// backend. Deleting a missing object fails only if the backend says so.
    pub async fn delete(&self, location: &str, filename: &str) -> StorageResult<()> {
        if is_forbidden_delete_filename(filename) {
            return Err(StorageError::InvalidFilename(filename.to_string()));
        }

        let key = object_key(location, filename);

        self.backend
            .delete(&self.bucket, &key)
            .await
            .map_err(|e| StorageError::StoreDeleteFailed {
                key: key.clone(),
                source: e,
            })?;

        tracing::debug!(key = %key, "Deleted object");

        Ok(())
    }

    /// Open `{location}/{filename}` for reading.
    ///
    /// Missing objects and transport failures both surface as
    /// `StoreReadFailed`; use `StorageError::is_not_found` to tell them apart.
    pub async fn get(&self, location: &str, filename: &str) -> StorageResult<FetchedObject> {
        let key = object_key(location, filename);

        let body = self
            .backend
            .get(&self.bucket, &key)
            .await
            .map_err(|e| StorageError::StoreReadFailed {
                key: key.clone(),
                source: e,
            })?;

        Ok(FetchedObject {
            body,
            public_url: public_url(&self.public_base_url, &key),
        })
    }

    /// List the first page of the bucket, keeping keys that match `filter_pattern`.
    ///
    /// An empty pattern keeps everything. The pattern is a regular expression
    /// matched anywhere in the key and is compiled before the backend is called.
    pub async fn list(&self, filter_pattern: &str) -> StorageResult<Listing> {
        let filter = if filter_pattern.is_empty() {
            None
        } else {
            Some(Regex::new(filter_pattern)?)
        };

        let entries = self
            .backend
            .list(&self.bucket, LIST_PAGE_SIZE)
            .await
            .map_err(|e| StorageError::StoreListFailed {
                bucket: self.bucket.clone(),
                source: e,
            })?;

        let listing = Listing::new(entries, filter);

        tracing::debug!(
            bucket = %self.bucket,
            filter = %filter_pattern,
            page_len = listing.page_len(),
            matched = listing.iter().count(),
            "Listed objects"
        );

        Ok(listing)
    }
}

impl fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageClient")
            .field("bucket", &self.bucket)
            .field("public_base_url", &self.public_base_url)
            .field("backend", &self.backend.backend_type())
            .finish()
    }
}
