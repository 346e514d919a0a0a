//! Session-local handles to decoded blobs.
//!
//! A [`BlobHandle`] plays the part of an object URL: it is issued when a blob
//! is brought into memory, used for preview and download, and revoked when
//! the owning document goes away.  Handles are never persisted; every load
//! issues fresh ones.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use docshelf_shared::codec::Blob;
use docshelf_shared::constants::HANDLE_SCHEME;
use uuid::Uuid;

use crate::error::{Result, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobHandle(String);

impl BlobHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry of live handles.  Cloning shares the same registry.
#[derive(Debug, Clone, Default)]
pub struct HandleRegistry {
    live: Arc<RwLock<HashMap<BlobHandle, Blob>>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, blob: Blob) -> Result<BlobHandle> {
        let handle = BlobHandle(format!("{HANDLE_SCHEME}{}", Uuid::new_v4()));
        self.live
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .insert(handle.clone(), blob);
        Ok(handle)
    }

    /// Return the blob behind a live handle.
    pub fn resolve(&self, handle: &BlobHandle) -> Result<Blob> {
        self.live
            .read()
            .map_err(|_| StoreError::LockPoisoned)?
            .get(handle)
            .cloned()
            .ok_or_else(|| StoreError::HandleRevoked(handle.to_string()))
    }

    /// Invalidate a handle.  Returns `true` if it was live.
    pub fn revoke(&self, handle: &BlobHandle) -> Result<bool> {
        let removed = self
            .live
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .remove(handle)
            .is_some();
        if removed {
            tracing::debug!(%handle, "revoked blob handle");
        }
        Ok(removed)
    }

    pub fn revoke_all(&self) -> Result<usize> {
        let mut live = self.live.write().map_err(|_| StoreError::LockPoisoned)?;
        let count = live.len();
        live.clear();
        Ok(count)
    }

    pub fn live_count(&self) -> usize {
        self.live.read().map(|live| live.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_resolve() {
        let registry = HandleRegistry::new();
        let blob = Blob::new("text/plain", b"hello".to_vec());

        let handle = registry.issue(blob.clone()).unwrap();
        assert!(handle.as_str().starts_with(HANDLE_SCHEME));
        assert_eq!(registry.resolve(&handle).unwrap(), blob);
    }

    #[test]
    fn test_revoked_handle_fails() {
        let registry = HandleRegistry::new();
        let handle = registry.issue(Blob::new("text/plain", b"x".to_vec())).unwrap();

        assert!(registry.revoke(&handle).unwrap());
        assert!(matches!(
            registry.resolve(&handle),
            Err(StoreError::HandleRevoked(_))
        ));
        assert!(!registry.revoke(&handle).unwrap());
    }

    #[test]
    fn test_handles_are_unique() {
        let registry = HandleRegistry::new();
        let blob = Blob::new("", Vec::new());
        let a = registry.issue(blob.clone()).unwrap();
        let b = registry.issue(blob).unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.live_count(), 2);
        assert_eq!(registry.revoke_all().unwrap(), 2);
        assert_eq!(registry.live_count(), 0);
    }
}
