//! Object storage abstraction for file attachments.
//!
//! The gateway writes bytes through [`ObjectStorage`] before it records
//! metadata; the trait models a durable blob store that hands back a
//! stable URL. [`LocalObjectStorage`] writes to a directory on disk.

use std::fmt::Write as _;
use std::path::PathBuf;

use rand::RngCore;

use intake_core::CoreError;

/// Result of a successful storage write.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Stable URL under which the object is reachable.
    pub url: String,
    /// Storage-side object name (unique, not the client file name).
    pub file_name: String,
    pub size_bytes: i64,
}

#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Persist `bytes` under a unique name derived from `file_name`.
    /// Failures map to `CoreError::Storage`.
    async fn put(&self, file_name: &str, bytes: &[u8]) -> Result<StoredObject, CoreError>;
}

/// Filesystem-backed storage for local deployments and development.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }
}

/// Unique object name: millisecond timestamp, random hex, sanitized
/// original name. Keeps the extension so served files get a sensible
/// content type.
fn object_name(file_name: &str) -> String {
    let mut rng = rand::thread_rng();
    let mut suffix = String::with_capacity(12);
    for _ in 0..6 {
        let _ = write!(suffix, "{:02x}", (rng.next_u32() & 0xff) as u8);
    }
    let safe: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}-{}-{}", chrono::Utc::now().timestamp_millis(), suffix, safe)
}

#[async_trait::async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn put(&self, file_name: &str, bytes: &[u8]) -> Result<StoredObject, CoreError> {
        let name = object_name(file_name);
        let path = self.root.join(&name);
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CoreError::Storage(format!("create upload dir: {e}")))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| CoreError::Storage(format!("write {}: {e}", path.display())))?;
        Ok(StoredObject {
            url: format!("{}/{}", self.base_url.trim_end_matches('/'), name),
            file_name: name,
            size_bytes: bytes.len() as i64,
        })
    }
}
